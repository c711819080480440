use super::events::ArrivalEvent;
use crate::common::{AggregateRoot, MoveId};
use crate::domains::geometry::{distance, Position2D};
use crate::domains::move_tracking::{MoveCommand, MoveState};
use crate::domains::pose_stream::PoseSample;
use crate::domains::waypoint::Waypoint;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrivalStatus {
    Moving,
    Near,
    Arrived,
}

impl fmt::Display for ArrivalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArrivalStatus::Moving => "moving",
            ArrivalStatus::Near => "near",
            ArrivalStatus::Arrived => "arrived",
        };
        f.write_str(s)
    }
}

/// Waypoint resolution result, bound to the move it was resolved for.
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointCache {
    pub move_id: MoveId,
    pub waypoint: Option<Waypoint>,
}

/// Outcome of applying one observation to the tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub status: ArrivalStatus,
    pub distance: Option<f64>,
    /// A `StatusChanged` event was recorded.
    pub changed: bool,
    /// Near but not yet arrived: worth asking the ledger whether the move has succeeded.
    pub recheck_state: bool,
    /// Arrived and no waypoint cached for the current move yet.
    pub resolve_waypoint: bool,
}

/// Arrival classification for one device.
///
/// Once `Arrived` is reached for a move it latches until a move with a
/// different id is observed. Status changes are recorded as events only on
/// edges, so repeated samples with the same classification stay silent.
#[derive(Debug, Clone)]
pub struct ArrivalTracker {
    pub device: String,
    pub near_off: f64,
    pub current_move: Option<MoveCommand>,
    pub latest_pose: Option<PoseSample>,
    pub last_emitted: Option<ArrivalStatus>,
    pub arrived: bool,
    pub last_distance: Option<f64>,
    pub version: u64,
    waypoint: Option<WaypointCache>,
    uncommitted_events: Vec<ArrivalEvent>,
}

impl ArrivalTracker {
    pub fn new(device: impl Into<String>, near_off: f64) -> Self {
        Self {
            device: device.into(),
            near_off,
            current_move: None,
            latest_pose: None,
            last_emitted: None,
            arrived: false,
            last_distance: None,
            version: 0,
            waypoint: None,
            uncommitted_events: Vec::new(),
        }
    }

    pub fn status(&self) -> ArrivalStatus {
        self.last_emitted.unwrap_or(ArrivalStatus::Moving)
    }

    pub fn current_move_id(&self) -> Option<&MoveId> {
        self.current_move.as_ref().map(|m| &m.id)
    }

    pub fn cached_waypoint(&self) -> Option<&WaypointCache> {
        let current = self.current_move_id()?;
        self.waypoint.as_ref().filter(|c| &c.move_id == current)
    }

    pub fn observe_move(&mut self, command: MoveCommand) -> Evaluation {
        if self.current_move_id() == Some(&command.id) {
            return self.observe_move_state(&command.id, command.state);
        }

        self.add_event(ArrivalEvent::MoveStarted {
            device: self.device.clone(),
            move_id: command.id.clone(),
            target: command.target,
            state: command.state,
            timestamp: Utc::now(),
        });

        let succeeded = command.state == MoveState::Succeeded;
        self.current_move = Some(command);
        self.latest_pose = None;
        self.last_distance = None;
        self.waypoint = None;
        self.arrived = succeeded;

        if succeeded {
            self.transition(ArrivalStatus::Arrived, None)
        } else {
            self.transition(ArrivalStatus::Moving, None)
        }
    }

    /// Refresh the lifecycle state of the current move. Stale ids are ignored.
    pub fn observe_move_state(&mut self, id: &MoveId, state: MoveState) -> Evaluation {
        match self.current_move.as_mut() {
            Some(current) if &current.id == id => current.state = state,
            _ => return self.unchanged(),
        }
        self.evaluate()
    }

    pub fn observe_pose(&mut self, sample: PoseSample) -> Evaluation {
        self.latest_pose = Some(sample);
        self.evaluate()
    }

    /// Cache the resolution for `move_id`. Returns false when the move is no
    /// longer current or a result is already cached.
    pub fn record_waypoint(&mut self, move_id: &MoveId, waypoint: Option<Waypoint>) -> bool {
        if self.current_move_id() != Some(move_id) || self.cached_waypoint().is_some() {
            return false;
        }
        self.waypoint = Some(WaypointCache {
            move_id: move_id.clone(),
            waypoint: waypoint.clone(),
        });
        self.add_event(ArrivalEvent::WaypointResolved {
            device: self.device.clone(),
            move_id: move_id.clone(),
            waypoint,
            timestamp: Utc::now(),
        });
        true
    }

    fn evaluate(&mut self) -> Evaluation {
        let Some((state, target)) = self.current_move.as_ref().map(|m| (m.state, m.target)) else {
            return self.unchanged();
        };
        if state == MoveState::Succeeded {
            self.arrived = true;
        }
        let distance = self
            .latest_pose
            .as_ref()
            .map(|pose| distance(&pose.position, &target));
        if distance.is_some() {
            self.last_distance = distance;
        }

        if self.arrived {
            return self.transition(ArrivalStatus::Arrived, distance);
        }
        match distance {
            Some(d) if d < self.near_off => self.transition(ArrivalStatus::Near, distance),
            Some(_) => self.transition(ArrivalStatus::Moving, distance),
            None => self.unchanged(),
        }
    }

    fn transition(&mut self, to: ArrivalStatus, distance: Option<f64>) -> Evaluation {
        let from = self.last_emitted;
        let changed = from != Some(to);
        if changed {
            if let Some(move_id) = self.current_move_id().cloned() {
                self.add_event(ArrivalEvent::StatusChanged {
                    device: self.device.clone(),
                    move_id,
                    from,
                    to,
                    position: self.latest_pose.as_ref().map(|p| p.position),
                    distance,
                    timestamp: Utc::now(),
                });
            }
            self.last_emitted = Some(to);
        }
        self.evaluation(to, distance, changed)
    }

    fn unchanged(&self) -> Evaluation {
        self.evaluation(self.status(), None, false)
    }

    fn evaluation(&self, status: ArrivalStatus, distance: Option<f64>, changed: bool) -> Evaluation {
        let has_move = self.current_move.is_some();
        Evaluation {
            status,
            distance,
            changed,
            recheck_state: has_move && status == ArrivalStatus::Near && !self.arrived,
            resolve_waypoint: has_move
                && status == ArrivalStatus::Arrived
                && self.cached_waypoint().is_none(),
        }
    }

    /// Position of the current target, if a move is being tracked.
    pub fn target(&self) -> Option<Position2D> {
        self.current_move.as_ref().map(|m| m.target)
    }
}

impl AggregateRoot for ArrivalTracker {
    type Event = ArrivalEvent;

    fn aggregate_id(&self) -> &str {
        &self.device
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn take_uncommitted_events(&mut self) -> Vec<Self::Event> {
        std::mem::take(&mut self.uncommitted_events)
    }

    fn add_event(&mut self, event: Self::Event) {
        self.version += 1;
        self.uncommitted_events.push(event);
    }
}
