use super::types::MoveRecord;
use crate::common::{MonitorResult, MoveId};
use async_trait::async_trait;

/// Port onto the robot's move/task ledger.
#[async_trait]
pub trait MoveLedger: Send + Sync {
    /// Most recent move, if the ledger has any.
    async fn latest_move(&self) -> MonitorResult<Option<MoveRecord>>;
    /// Full record for a move; `None` when the ledger no longer knows it.
    async fn move_details(&self, id: &MoveId) -> MonitorResult<Option<MoveRecord>>;
}
