use super::aggregate::{ArrivalTracker, Evaluation, WaypointCache};
use super::events::ArrivalEvent;
use super::projections::DeviceStatus;
use crate::common::{AggregateRoot, MoveId};
use crate::domains::logger::DynLogger;
use crate::domains::move_tracking::{MoveCommand, MoveLedger, MoveState};
use crate::domains::pose_stream::PoseSample;
use crate::domains::waypoint::{waypoint_name, WaypointResolver};
use chrono::Duration;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};

const EVENT_CAPACITY: usize = 64;
const DEFAULT_ACTIVITY_WINDOW_SECS: i64 = 60;

/// Everything the poll loop and the stream loop feed into a device monitor.
#[derive(Debug, Clone)]
pub enum MonitorInput {
    Move(MoveCommand),
    MoveState { id: MoveId, state: MoveState },
    Pose(PoseSample),
}

/// Keep every move input in order but only the newest pose, which
/// supersedes all earlier ones.
pub fn coalesce_poses(inputs: Vec<MonitorInput>) -> Vec<MonitorInput> {
    let last_pose = inputs
        .iter()
        .rposition(|input| matches!(input, MonitorInput::Pose(_)));
    inputs
        .into_iter()
        .enumerate()
        .filter(|(i, input)| !matches!(input, MonitorInput::Pose(_)) || Some(*i) == last_pose)
        .map(|(_, input)| input)
        .collect()
}

/// Single writer of one device's [`ArrivalTracker`].
///
/// The move tracker and pose stream tasks only send inputs; all
/// read-modify-write of the arrival state happens here, one input at a time.
pub struct DeviceMonitor {
    tracker: ArrivalTracker,
    serial_number: Option<String>,
    ledger: Arc<dyn MoveLedger>,
    resolver: WaypointResolver,
    recheck_state_when_near: bool,
    activity_window: Duration,
    input_receiver: mpsc::Receiver<MonitorInput>,
    status_sender: watch::Sender<DeviceStatus>,
    event_sender: broadcast::Sender<ArrivalEvent>,
    logger: DynLogger,
}

impl DeviceMonitor {
    pub fn new(
        tracker: ArrivalTracker,
        ledger: Arc<dyn MoveLedger>,
        resolver: WaypointResolver,
        input_receiver: mpsc::Receiver<MonitorInput>,
        logger: DynLogger,
    ) -> Self {
        let activity_window = Duration::seconds(DEFAULT_ACTIVITY_WINDOW_SECS);
        let (status_sender, _) =
            watch::channel(DeviceStatus::from_tracker(&tracker, None, activity_window));
        let (event_sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            tracker,
            serial_number: None,
            ledger,
            resolver,
            recheck_state_when_near: true,
            activity_window,
            input_receiver,
            status_sender,
            event_sender,
            logger,
        }
    }

    pub fn with_serial_number(mut self, serial_number: Option<String>) -> Self {
        self.serial_number = serial_number;
        self.status_sender.send_replace(self.current_status());
        self
    }

    pub fn with_activity_window(mut self, window: Duration) -> Self {
        self.activity_window = window;
        self.status_sender.send_replace(self.current_status());
        self
    }

    pub fn with_state_recheck(mut self, enabled: bool) -> Self {
        self.recheck_state_when_near = enabled;
        self
    }

    pub fn status_receiver(&self) -> watch::Receiver<DeviceStatus> {
        self.status_sender.subscribe()
    }

    pub fn event_sender(&self) -> broadcast::Sender<ArrivalEvent> {
        self.event_sender.clone()
    }

    pub fn tracker(&self) -> &ArrivalTracker {
        &self.tracker
    }

    pub async fn run(&mut self) {
        while let Some(first) = self.input_receiver.recv().await {
            let mut batch = vec![first];
            while let Ok(next) = self.input_receiver.try_recv() {
                batch.push(next);
            }
            for input in coalesce_poses(batch) {
                self.handle_input(input).await;
            }
        }
        tracing::debug!(device = %self.tracker.device, "Device monitor stopped");
    }

    pub async fn handle_input(&mut self, input: MonitorInput) {
        let evaluation = match input {
            MonitorInput::Move(command) => self.tracker.observe_move(command),
            MonitorInput::MoveState { id, state } => self.tracker.observe_move_state(&id, state),
            MonitorInput::Pose(sample) => self.tracker.observe_pose(sample),
        };
        self.follow_up(evaluation).await;
        self.publish();
    }

    async fn follow_up(&mut self, mut evaluation: Evaluation) {
        if evaluation.recheck_state && self.recheck_state_when_near {
            evaluation = self.recheck_move_state().await.unwrap_or(evaluation);
        }
        if evaluation.resolve_waypoint {
            self.waypoint().await;
        }
    }

    /// The ledger may report success before the pose stream gets inside the
    /// target radius; ask it again while near.
    async fn recheck_move_state(&mut self) -> Option<Evaluation> {
        let id = self.tracker.current_move_id()?.clone();
        match self.ledger.move_details(&id).await {
            Ok(Some(record)) => {
                let state = record.state?;
                Some(self.tracker.observe_move_state(&id, state))
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(device = %self.tracker.device, move_id = %id, "Move state re-check failed: {}", e);
                None
            }
        }
    }

    /// Waypoint for the current move. Resolved at most once per move; later
    /// calls return the cached result without touching the map source.
    pub async fn waypoint(&mut self) -> Option<WaypointCache> {
        if let Some(cached) = self.tracker.cached_waypoint() {
            return Some(cached.clone());
        }
        let move_id = self.tracker.current_move_id()?.clone();
        let target = self.tracker.target()?;
        match self.resolver.resolve(&target).await {
            Ok(waypoint) => {
                self.tracker.record_waypoint(&move_id, waypoint);
                self.publish();
                self.tracker.cached_waypoint().cloned()
            }
            Err(e) => {
                // Left uncached so the next arrived evaluation tries again.
                tracing::warn!(device = %self.tracker.device, move_id = %move_id, "Waypoint resolution failed: {}", e);
                None
            }
        }
    }

    fn publish(&mut self) {
        for event in self.tracker.take_uncommitted_events() {
            self.announce(&event);
            // No subscribers is fine.
            let _ = self.event_sender.send(event);
        }
        self.status_sender.send_replace(self.current_status());
    }

    fn current_status(&self) -> DeviceStatus {
        DeviceStatus::from_tracker(&self.tracker, self.serial_number.clone(), self.activity_window)
    }

    fn announce(&self, event: &ArrivalEvent) {
        let line = match event {
            ArrivalEvent::MoveStarted { device, move_id, target, state, .. } => format!(
                "Robot {}: new move {} ({:?}) to ({:.4}, {:.4})",
                device, move_id, state, target.x, target.y
            ),
            ArrivalEvent::StatusChanged { device, move_id, to, position, distance, .. } => {
                let mut line = format!("Robot {}: move {} is {}", device, move_id, to);
                if let Some(p) = position {
                    line.push_str(&format!(", position ({:.4}, {:.4})", p.x, p.y));
                }
                if let Some(d) = distance {
                    line.push_str(&format!(", distance {:.4} m", d));
                }
                line
            }
            ArrivalEvent::WaypointResolved { device, move_id, waypoint, .. } => format!(
                "Robot {}: move {} point id {}",
                device,
                move_id,
                waypoint_name(waypoint.as_ref())
            ),
        };
        self.logger.info(&line);
    }
}
