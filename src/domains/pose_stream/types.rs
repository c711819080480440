use crate::common::{MonitorError, MonitorResult};
use crate::domains::geometry::Position2D;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_POSE_TOPIC: &str = "/tracked_pose";

/// Latest known robot position. Each sample supersedes the previous one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoseSample {
    pub position: Position2D,
    pub received_at: DateTime<Utc>,
}

impl PoseSample {
    pub fn new(position: Position2D) -> Self {
        Self {
            position,
            received_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EnableTopic<'a> {
    pub enable_topic: &'a str,
}

pub fn subscription_message(topic: &str) -> MonitorResult<String> {
    Ok(serde_json::to_string(&EnableTopic { enable_topic: topic })?)
}

#[derive(Debug, Deserialize)]
struct TopicFrame {
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    pos: Option<serde_json::Value>,
}

/// Extract a pose sample from a raw frame.
///
/// Frames for other topics yield `Ok(None)`. A frame on the pose topic without
/// a usable `pos` is a payload error.
pub fn parse_pose_frame(text: &str, topic: &str) -> MonitorResult<Option<PoseSample>> {
    let frame: TopicFrame = serde_json::from_str(text)?;
    if frame.topic.as_deref() != Some(topic) {
        return Ok(None);
    }
    // Only frames on the pose topic are required to carry numeric positions.
    let pos = frame
        .pos
        .and_then(|value| serde_json::from_value::<Vec<f64>>(value).ok())
        .as_deref()
        .and_then(Position2D::from_slice)
        .ok_or_else(|| MonitorError::Payload(format!("{} frame without position", topic)))?;
    Ok(Some(PoseSample::new(pos)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tracked_pose_frame() {
        let text = r#"{"topic": "/tracked_pose", "pos": [1.25, -3.5], "ori": 0.3}"#;
        let sample = parse_pose_frame(text, DEFAULT_POSE_TOPIC).unwrap().unwrap();
        assert_eq!(sample.position, Position2D::new(1.25, -3.5));
    }

    #[test]
    fn ignores_other_topics() {
        let text = r#"{"topic": "/battery_state", "percentage": 0.8}"#;
        assert!(parse_pose_frame(text, DEFAULT_POSE_TOPIC).unwrap().is_none());
    }

    #[test]
    fn rejects_pose_without_position() {
        let text = r#"{"topic": "/tracked_pose", "pos": [1.0]}"#;
        assert!(parse_pose_frame(text, DEFAULT_POSE_TOPIC).is_err());
        assert!(parse_pose_frame("not json", DEFAULT_POSE_TOPIC).is_err());
    }

    #[test]
    fn subscription_names_topic() {
        assert_eq!(
            subscription_message("/tracked_pose").unwrap(),
            r#"{"enable_topic":"/tracked_pose"}"#
        );
    }
}
