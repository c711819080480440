use arrival_monitor::common::{MapId, MonitorError, MonitorResult};
use arrival_monitor::domains::geometry::Position2D;
use arrival_monitor::domains::waypoint::*;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

fn map_document(features: serde_json::Value) -> String {
    let overlays = json!({ "type": "FeatureCollection", "features": features }).to_string();
    json!({ "id": 3, "map_name": "office", "overlays": overlays }).to_string()
}

fn point(name: serde_json::Value, x: f64, y: f64) -> serde_json::Value {
    json!({
        "type": "Feature",
        "properties": { "name": name },
        "geometry": { "type": "Point", "coordinates": [x, y] }
    })
}

fn desk_overlay() -> MapOverlay {
    let raw = map_document(json!([point(json!("DeskA"), 0.7875, 7.17)]));
    MapOverlay::from_document(MapId::new("3"), &raw).unwrap()
}

#[test]
fn test_float_noise_still_matches() {
    let overlay = desk_overlay();
    let target = Position2D::new(0.78750000, 7.170000000000001);
    let found = overlay.find(&target, MatchPolicy::default());
    assert_eq!(waypoint_name(found), "DeskA");
}

#[test]
fn test_nearby_targets_do_not_match_by_default() {
    let overlay = desk_overlay();
    for x in [0.78751, 0.7876] {
        let found = overlay.find(&Position2D::new(x, 7.17), MatchPolicy::default());
        assert_eq!(waypoint_name(found), NO_WAYPOINT);
    }
}

#[test]
fn test_rounded_policy_compares_four_decimals() {
    let overlay = desk_overlay();
    let rounded = MatchPolicy::Rounded;
    assert!(overlay.find(&Position2D::new(0.78751, 7.17), rounded).is_some());
    assert!(overlay.find(&Position2D::new(0.7876, 7.17), rounded).is_none());
}

#[test]
fn test_first_match_wins() {
    let raw = map_document(json!([
        point(json!("first"), 1.0, 2.0),
        point(json!("second"), 1.0, 2.0),
    ]));
    let overlay = MapOverlay::from_document(MapId::new("3"), &raw).unwrap();
    let found = overlay.find(&Position2D::new(1.0, 2.0), MatchPolicy::default());
    assert_eq!(found.unwrap().name, "first");
}

#[test]
fn test_nested_geometries_use_first_vertex() {
    let raw = map_document(json!([
        {
            "type": "Feature",
            "properties": { "name": "corridor" },
            "geometry": { "type": "LineString", "coordinates": [[4.0, 5.0], [6.0, 7.0]] }
        },
        {
            "type": "Feature",
            "properties": { "name": "room" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[9.0, 1.0], [9.0, 3.0], [11.0, 3.0], [9.0, 1.0]]]
            }
        }
    ]));
    let overlay = MapOverlay::from_document(MapId::new("3"), &raw).unwrap();
    let policy = MatchPolicy::default();

    assert_eq!(overlay.find(&Position2D::new(4.0, 5.0), policy).unwrap().name, "corridor");
    assert!(overlay.find(&Position2D::new(6.0, 7.0), policy).is_none());
    assert_eq!(overlay.find(&Position2D::new(9.0, 1.0), policy).unwrap().name, "room");
}

#[test]
fn test_unnamed_features_are_skipped_and_numeric_names_kept() {
    let raw = map_document(json!([
        {
            "type": "Feature",
            "properties": { "kind": "charger" },
            "geometry": { "type": "Point", "coordinates": [1.0, 1.0] }
        },
        { "type": "Feature", "properties": { "name": "ghost" }, "geometry": null },
        point(json!(42), 1.0, 1.0),
    ]));
    let overlay = MapOverlay::from_document(MapId::new("3"), &raw).unwrap();

    assert_eq!(overlay.points.len(), 1);
    assert_eq!(overlay.points[0].name, "42");
}

#[test]
fn test_overlays_must_be_a_feature_collection() {
    let raw = json!({ "overlays": "{\"type\": \"Point\", \"coordinates\": [1.0, 2.0]}" }).to_string();
    let result = MapOverlay::from_document(MapId::new("1"), &raw);
    assert!(matches!(result, Err(MonitorError::Geometry(_))));

    let missing = MapOverlay::from_document(MapId::new("1"), r#"{"id": 1}"#);
    assert!(matches!(missing, Err(MonitorError::Decode(_))));
}

struct StaticMaps {
    map_id: MapId,
    document: String,
}

#[async_trait]
impl MapSource for StaticMaps {
    async fn current_map_id(&self) -> MonitorResult<MapId> {
        Ok(self.map_id.clone())
    }

    async fn map_document(&self, id: &MapId) -> MonitorResult<String> {
        assert_eq!(id, &self.map_id);
        Ok(self.document.clone())
    }
}

#[tokio::test]
async fn test_resolver_reads_current_map() {
    let maps = Arc::new(StaticMaps {
        map_id: MapId::new("12"),
        document: map_document(json!([point(json!("DeskA"), 0.7875, 7.17)])),
    });
    let resolver = WaypointResolver::new(maps, MatchPolicy::default());

    let hit = resolver.resolve(&Position2D::new(0.7875, 7.17)).await.unwrap();
    assert_eq!(hit.unwrap().name, "DeskA");

    let miss = resolver.resolve(&Position2D::new(3.0, 3.0)).await.unwrap();
    assert!(miss.is_none());

    let overlay = resolver.fetch_overlay().await.unwrap();
    assert_eq!(overlay.map_id, MapId::new("12"));
}
