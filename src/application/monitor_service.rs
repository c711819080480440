// Single-device wiring: move tracker + pose stream + arrival monitor
use crate::config::MonitorSettings;
use crate::domains::arrival::{ArrivalEvent, ArrivalTracker, DeviceMonitor, DeviceStatus, MonitorInput};
use crate::domains::logger::DynLogger;
use crate::domains::move_tracking::{MoveLedger, MoveTracker};
use crate::domains::pose_stream::{PoseStreamClient, TopicTransport};
use crate::domains::waypoint::{MapSource, MatchPolicy, WaypointResolver};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

const INPUT_CAPACITY: usize = 256;

/// The ports one device monitor talks through.
#[derive(Clone)]
pub struct DeviceEndpoints {
    pub ledger: Arc<dyn MoveLedger>,
    pub maps: Arc<dyn MapSource>,
    pub topics: Arc<dyn TopicTransport>,
}

/// Running monitor for one device.
pub struct DeviceHandle {
    device: String,
    status: watch::Receiver<DeviceStatus>,
    events: broadcast::Sender<ArrivalEvent>,
    tasks: Vec<JoinHandle<()>>,
}

impl DeviceHandle {
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Latest published status.
    pub fn status(&self) -> DeviceStatus {
        self.status.borrow().clone()
    }

    pub fn status_receiver(&self) -> watch::Receiver<DeviceStatus> {
        self.status.clone()
    }

    /// Arrival events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ArrivalEvent> {
        self.events.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.tasks.iter().any(|t| !t.is_finished())
    }

    pub fn shutdown(&self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

impl Drop for DeviceHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

pub struct DeviceMonitorService;

impl DeviceMonitorService {
    /// Spawn the poll loop, the stream loop and the monitor actor for `device`.
    ///
    /// Each task owns its own copy of the device address and its own port
    /// handles; nothing is shared with other devices except what the ports
    /// themselves share.
    pub fn spawn(
        device: String,
        serial_number: Option<String>,
        settings: &MonitorSettings,
        match_policy: MatchPolicy,
        endpoints: DeviceEndpoints,
        logger: DynLogger,
    ) -> DeviceHandle {
        let (input_sender, input_receiver) = mpsc::channel::<MonitorInput>(INPUT_CAPACITY);

        let tracker = ArrivalTracker::new(device.clone(), settings.near_off);
        let resolver = WaypointResolver::new(endpoints.maps.clone(), match_policy);
        let mut monitor = DeviceMonitor::new(
            tracker,
            endpoints.ledger.clone(),
            resolver,
            input_receiver,
            logger,
        )
        .with_serial_number(serial_number)
        .with_state_recheck(settings.recheck_state_when_near)
        .with_activity_window(settings.activity_window());

        let status = monitor.status_receiver();
        let events = monitor.event_sender();

        let move_tracker = MoveTracker::new(
            device.clone(),
            endpoints.ledger.clone(),
            settings.poll_interval(),
        );
        let pose_client = PoseStreamClient::new(
            device.clone(),
            endpoints.topics.clone(),
            settings.pose_topic.clone(),
            settings.reconnect_delay(),
        );

        let tasks = vec![
            tokio::spawn(async move { monitor.run().await }),
            tokio::spawn(move_tracker.run(input_sender.clone())),
            tokio::spawn(pose_client.run(input_sender)),
        ];

        tracing::info!(device = %device, "Device monitor started");
        DeviceHandle {
            device,
            status,
            events,
            tasks,
        }
    }
}
