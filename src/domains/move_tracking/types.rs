use crate::common::{MonitorError, MonitorResult, MoveId};
use crate::domains::geometry::Position2D;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveState {
    #[serde(alias = "moving")]
    InProgress,
    Succeeded,
    Failed,
    Cancelled,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A move as reported by the ledger, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct MoveRecord {
    pub id: MoveId,
    #[serde(default)]
    pub state: Option<MoveState>,
    #[serde(default)]
    pub target_x: Option<f64>,
    #[serde(default)]
    pub target_y: Option<f64>,
    /// UNIX seconds
    #[serde(default)]
    pub create_time: Option<f64>,
}

impl MoveRecord {
    pub fn into_command(self) -> MonitorResult<MoveCommand> {
        let (x, y) = match (self.target_x, self.target_y) {
            (Some(x), Some(y)) => (x, y),
            _ => {
                return Err(MonitorError::Payload(format!(
                    "move {} has no target coordinates",
                    self.id
                )))
            }
        };
        let created_at = self
            .create_time
            .and_then(|secs| DateTime::<Utc>::from_timestamp_millis((secs * 1000.0) as i64));

        Ok(MoveCommand {
            id: self.id,
            target: Position2D::new(x, y),
            state: self.state.unwrap_or_default(),
            created_at,
        })
    }
}

/// A validated move. Replaced wholesale whenever a new id shows up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveCommand {
    pub id: MoveId,
    pub target: Position2D,
    pub state: MoveState,
    pub created_at: Option<DateTime<Utc>>,
}

impl MoveCommand {
    pub fn new(id: impl Into<String>, target: Position2D, state: MoveState) -> Self {
        Self {
            id: MoveId::new(id),
            target,
            state,
            created_at: None,
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// A robot counts as active while its move is running or was issued within `window`.
    pub fn is_recent(&self, now: DateTime<Utc>, window: Duration) -> bool {
        if self.state == MoveState::InProgress {
            return true;
        }
        self.created_at
            .map(|created| now.signed_duration_since(created) < window)
            .unwrap_or(false)
    }
}

/// What one ledger poll found out.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveUpdate {
    /// A move with an id not seen before.
    Started(MoveCommand),
    /// The tracked move reported a different lifecycle state.
    StateChanged { id: MoveId, state: MoveState },
}
