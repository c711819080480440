use super::ports::MapSource;
use super::types::{MapOverlay, MatchPolicy, Waypoint};
use crate::common::MonitorResult;
use crate::domains::geometry::Position2D;
use std::sync::Arc;

/// Maps target coordinates to a named waypoint on the robot's active map.
///
/// The overlay is fetched fresh on every call because the active map can
/// change between resolutions. Per-move caching is the caller's job.
#[derive(Clone)]
pub struct WaypointResolver {
    maps: Arc<dyn MapSource>,
    policy: MatchPolicy,
}

impl WaypointResolver {
    pub fn new(maps: Arc<dyn MapSource>, policy: MatchPolicy) -> Self {
        Self { maps, policy }
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    pub async fn fetch_overlay(&self) -> MonitorResult<MapOverlay> {
        let map_id = self.maps.current_map_id().await?;
        let raw = self.maps.map_document(&map_id).await?;
        MapOverlay::from_document(map_id, &raw)
    }

    /// `Ok(None)` means the map was read but no feature sits on the target.
    pub async fn resolve(&self, target: &Position2D) -> MonitorResult<Option<Waypoint>> {
        let overlay = self.fetch_overlay().await?;
        let found = overlay.find(target, self.policy).cloned();
        match &found {
            Some(w) => tracing::info!(map_id = %overlay.map_id, waypoint = %w.name, "Resolved target to waypoint"),
            None => tracing::info!(
                map_id = %overlay.map_id,
                x = target.x,
                y = target.y,
                "Target not found in map overlays"
            ),
        }
        Ok(found)
    }
}
