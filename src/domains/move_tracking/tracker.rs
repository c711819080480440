use super::ports::MoveLedger;
use super::types::{MoveState, MoveUpdate};
use crate::common::{MonitorResult, MoveId};
use crate::domains::arrival::MonitorInput;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};

/// Polls the move ledger. Each newly observed move is reported once, and
/// afterwards every change of its lifecycle state.
pub struct MoveTracker {
    device: String,
    ledger: Arc<dyn MoveLedger>,
    interval: Duration,
    current: Option<MoveId>,
    last_state: Option<MoveState>,
}

impl MoveTracker {
    pub fn new(device: impl Into<String>, ledger: Arc<dyn MoveLedger>, interval: Duration) -> Self {
        Self {
            device: device.into(),
            ledger,
            interval,
            current: None,
            last_state: None,
        }
    }

    pub fn current_move_id(&self) -> Option<&MoveId> {
        self.current.as_ref()
    }

    /// One poll cycle.
    pub async fn poll_once(&mut self) -> MonitorResult<Option<MoveUpdate>> {
        let Some(latest) = self.ledger.latest_move().await? else {
            return Ok(None);
        };
        if self.current.as_ref() == Some(&latest.id) {
            return Ok(self.state_change(latest.id, latest.state));
        }

        // The tracked id only advances once details are in hand, so a failed
        // details fetch is retried on the next tick.
        let Some(mut details) = self.ledger.move_details(&latest.id).await? else {
            tracing::warn!(device = %self.device, move_id = %latest.id, "Move details not available yet");
            return Ok(None);
        };
        if details.state.is_none() {
            details.state = latest.state;
        }
        // A malformed move is dropped once rather than re-reported every tick.
        self.current = Some(latest.id);
        self.last_state = details.state;
        let command = details.into_command()?;
        tracing::info!(
            device = %self.device,
            move_id = %command.id,
            state = ?command.state,
            "New move observed"
        );
        Ok(Some(MoveUpdate::Started(command)))
    }

    fn state_change(&mut self, id: MoveId, state: Option<MoveState>) -> Option<MoveUpdate> {
        let state = state?;
        if self.last_state == Some(state) {
            return None;
        }
        self.last_state = Some(state);
        tracing::info!(device = %self.device, move_id = %id, state = ?state, "Move state changed");
        Some(MoveUpdate::StateChanged { id, state })
    }

    pub async fn run(mut self, tx: mpsc::Sender<MonitorInput>) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let input = match self.poll_once().await {
                Ok(Some(MoveUpdate::Started(command))) => MonitorInput::Move(command),
                Ok(Some(MoveUpdate::StateChanged { id, state })) => {
                    MonitorInput::MoveState { id, state }
                }
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(device = %self.device, "Skipping move poll: {}", e);
                    continue;
                }
            };
            if tx.send(input).await.is_err() {
                break;
            }
        }
        tracing::debug!(device = %self.device, "Move tracker stopped");
    }
}
