use crate::common::{MapId, MonitorResult};
use async_trait::async_trait;

/// Port onto the robot's map store.
#[async_trait]
pub trait MapSource: Send + Sync {
    /// Id of the map the robot is currently localised on. May change between calls.
    async fn current_map_id(&self) -> MonitorResult<MapId>;
    /// Raw map document. Its `overlays` field holds a JSON-encoded feature collection.
    async fn map_document(&self, id: &MapId) -> MonitorResult<String>;
}
