pub mod arrival;
pub mod geometry;
pub mod logger;
pub mod move_tracking;
pub mod pose_stream;
pub mod waypoint;

pub use arrival::{ArrivalEvent, ArrivalStatus, ArrivalTracker, DeviceMonitor, DeviceStatus, MonitorInput};
pub use geometry::Position2D;
pub use logger::{DomainLogger, DynLogger};
pub use move_tracking::{MoveCommand, MoveLedger, MoveState, MoveTracker};
pub use pose_stream::{PoseSample, PoseStreamClient, TopicTransport};
pub use waypoint::{MapSource, MatchPolicy, Waypoint, WaypointResolver};
