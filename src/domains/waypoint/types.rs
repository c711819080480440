use crate::common::{MapId, MonitorResult};
use crate::domains::geometry::{quantize4, Position2D};
use geojson::{Feature, FeatureCollection, GeoJson, Value};
use serde::{Deserialize, Serialize};

pub const NO_WAYPOINT: &str = "none";

/// A named point of interest on a map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Waypoint {
    pub name: String,
    pub position: Position2D,
}

impl Waypoint {
    pub fn new(name: impl Into<String>, position: Position2D) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }
}

/// Display name of a resolution result, `"none"` when nothing matched.
pub fn waypoint_name(waypoint: Option<&Waypoint>) -> &str {
    waypoint.map(|w| w.name.as_str()).unwrap_or(NO_WAYPOINT)
}

/// How a target is compared against overlay points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Both coordinates equal after rounding to 4 decimal places.
    Rounded,
    /// Both coordinates within `epsilon` of each other.
    Tolerance { epsilon: f64 },
}

impl Default for MatchPolicy {
    fn default() -> Self {
        MatchPolicy::Tolerance { epsilon: 1e-6 }
    }
}

impl MatchPolicy {
    pub fn matches(&self, target: &Position2D, candidate: &Position2D) -> bool {
        match *self {
            MatchPolicy::Rounded => {
                quantize4(target.x) == quantize4(candidate.x)
                    && quantize4(target.y) == quantize4(candidate.y)
            }
            MatchPolicy::Tolerance { epsilon } => {
                (target.x - candidate.x).abs() <= epsilon
                    && (target.y - candidate.y).abs() <= epsilon
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct MapDocument {
    overlays: String,
}

/// Named point features of one map, in collection order.
#[derive(Debug, Clone, PartialEq)]
pub struct MapOverlay {
    pub map_id: MapId,
    pub points: Vec<Waypoint>,
}

impl MapOverlay {
    /// Decode a map document whose `overlays` field is itself a serialized
    /// GeoJSON feature collection.
    pub fn from_document(map_id: MapId, raw: &str) -> MonitorResult<Self> {
        let document: MapDocument = serde_json::from_str(raw)?;
        let overlays: GeoJson = document.overlays.parse()?;
        let collection = FeatureCollection::try_from(overlays)?;
        Ok(Self::from_features(map_id, &collection))
    }

    pub fn from_features(map_id: MapId, collection: &FeatureCollection) -> Self {
        let points = collection
            .features
            .iter()
            .filter_map(|feature| {
                let point = named_point(feature);
                if point.is_none() {
                    tracing::debug!(map_id = %map_id, "Skipping overlay feature without name or position");
                }
                point
            })
            .collect();
        Self { map_id, points }
    }

    /// First point matching `target` in collection order.
    pub fn find(&self, target: &Position2D, policy: MatchPolicy) -> Option<&Waypoint> {
        self.points.iter().find(|p| policy.matches(target, &p.position))
    }
}

fn named_point(feature: &Feature) -> Option<Waypoint> {
    let name = match feature.property("name")? {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let position = anchor(&feature.geometry.as_ref()?.value)?;
    Some(Waypoint::new(name, position))
}

/// Representative point of a geometry: the point itself, or the first vertex
/// of a line or polygon.
fn anchor(value: &Value) -> Option<Position2D> {
    match value {
        Value::Point(p) => Position2D::from_slice(p),
        Value::MultiPoint(ps) | Value::LineString(ps) => {
            ps.first().and_then(|p| Position2D::from_slice(p))
        }
        Value::Polygon(rings) | Value::MultiLineString(rings) => rings
            .first()
            .and_then(|ring| ring.first())
            .and_then(|p| Position2D::from_slice(p)),
        Value::MultiPolygon(polygons) => polygons
            .first()
            .and_then(|rings| rings.first())
            .and_then(|ring| ring.first())
            .and_then(|p| Position2D::from_slice(p)),
        Value::GeometryCollection(members) => members.first().and_then(|g| anchor(&g.value)),
    }
}
