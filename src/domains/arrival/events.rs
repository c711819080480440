use super::aggregate::ArrivalStatus;
use crate::common::{DomainEvent, MoveId};
use crate::domains::geometry::Position2D;
use crate::domains::move_tracking::MoveState;
use crate::domains::waypoint::Waypoint;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ArrivalEvent {
    MoveStarted {
        device: String,
        move_id: MoveId,
        target: Position2D,
        state: MoveState,
        timestamp: DateTime<Utc>,
    },
    StatusChanged {
        device: String,
        move_id: MoveId,
        from: Option<ArrivalStatus>,
        to: ArrivalStatus,
        position: Option<Position2D>,
        distance: Option<f64>,
        timestamp: DateTime<Utc>,
    },
    WaypointResolved {
        device: String,
        move_id: MoveId,
        waypoint: Option<Waypoint>,
        timestamp: DateTime<Utc>,
    },
}

impl DomainEvent for ArrivalEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ArrivalEvent::MoveStarted { .. } => "MoveStarted",
            ArrivalEvent::StatusChanged { .. } => "StatusChanged",
            ArrivalEvent::WaypointResolved { .. } => "WaypointResolved",
        }
    }

    fn aggregate_id(&self) -> &str {
        match self {
            ArrivalEvent::MoveStarted { device, .. } => device,
            ArrivalEvent::StatusChanged { device, .. } => device,
            ArrivalEvent::WaypointResolved { device, .. } => device,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ArrivalEvent::MoveStarted { timestamp, .. } => *timestamp,
            ArrivalEvent::StatusChanged { timestamp, .. } => *timestamp,
            ArrivalEvent::WaypointResolved { timestamp, .. } => *timestamp,
        }
    }
}
