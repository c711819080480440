use super::aggregate::{ArrivalStatus, ArrivalTracker};
use crate::domains::move_tracking::MoveCommand;
use crate::domains::waypoint::NO_WAYPOINT;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    Active,
    Inactive,
}

/// What collaborators see for one device: arrival status plus the resolved waypoint name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceStatus {
    pub device: String,
    pub serial_number: Option<String>,
    pub arrival_status: ArrivalStatus,
    /// Resolved waypoint name; `None` until resolved or when nothing matched.
    pub waypoint: Option<String>,
    pub current_move: Option<MoveCommand>,
    /// Computed when the status was published.
    pub activity: Activity,
    pub distance: Option<f64>,
    pub updated_at: DateTime<Utc>,
}

impl DeviceStatus {
    pub fn new(device: impl Into<String>, serial_number: Option<String>) -> Self {
        Self {
            device: device.into(),
            serial_number,
            arrival_status: ArrivalStatus::Moving,
            waypoint: None,
            current_move: None,
            activity: Activity::Inactive,
            distance: None,
            updated_at: Utc::now(),
        }
    }

    pub fn from_tracker(
        tracker: &ArrivalTracker,
        serial_number: Option<String>,
        activity_window: Duration,
    ) -> Self {
        let now = Utc::now();
        let mut status = Self {
            device: tracker.device.clone(),
            serial_number,
            arrival_status: tracker.status(),
            waypoint: tracker
                .cached_waypoint()
                .and_then(|c| c.waypoint.as_ref())
                .map(|w| w.name.clone()),
            current_move: tracker.current_move.clone(),
            activity: Activity::Inactive,
            distance: tracker.last_distance,
            updated_at: now,
        };
        status.activity = status.activity_at(now, activity_window);
        status
    }

    pub fn waypoint_name(&self) -> &str {
        self.waypoint.as_deref().unwrap_or(NO_WAYPOINT)
    }

    pub fn activity_at(&self, now: DateTime<Utc>, window: Duration) -> Activity {
        match &self.current_move {
            Some(m) if m.is_recent(now, window) => Activity::Active,
            _ => Activity::Inactive,
        }
    }
}
