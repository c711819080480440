use crate::adapters::inbound::DEFAULT_ROBOT_PORT;
use crate::domains::pose_stream::DEFAULT_POSE_TOPIC;
use crate::domains::waypoint::MatchPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const ENV_PREFIX: &str = "ARRIVAL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub monitor: MonitorSettings,
    pub robot: RobotConfig,
    pub pool: PoolConfig,
    pub waypoints: WaypointConfig,
    pub logging: LoggingConfig,
}

/// Per-device monitoring parameters, constant for the lifetime of a monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    /// Distance in meters below which the robot counts as near its target.
    pub near_off: f64,
    pub poll_interval_ms: u64,
    pub reconnect_delay_ms: u64,
    pub pose_topic: String,
    pub recheck_state_when_near: bool,
    pub activity_window_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub devices: Vec<String>,
    pub port: u16,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub permits_per_device: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WaypointConfig {
    #[serde(rename = "match")]
    pub match_policy: MatchPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub status_file: Option<String>,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            near_off: 2.0,
            poll_interval_ms: 300,
            reconnect_delay_ms: 300,
            pose_topic: DEFAULT_POSE_TOPIC.to_string(),
            recheck_state_when_near: true,
            activity_window_secs: 60,
        }
    }
}

impl MonitorSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn activity_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.activity_window_secs)
    }
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            devices: Vec::new(),
            port: DEFAULT_ROBOT_PORT,
            request_timeout_ms: 5000,
        }
    }
}

impl RobotConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            permits_per_device: 2,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            status_file: None,
        }
    }
}

impl LoggingConfig {
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

impl Config {
    /// Read a TOML file. Missing sections and keys take their defaults.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Defaults, then the file if it exists, then `ARRIVAL__SECTION__KEY`
    /// environment variables (`ARRIVAL__ROBOT__DEVICES` is comma separated).
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let mut builder = ::config::Config::builder()
            .add_source(::config::Config::try_from(&Config::default())?);
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path.as_ref()).required(false));
        }
        let settings = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("robot.devices"),
            )
            .build()
            .context("building configuration")?;
        Ok(settings.try_deserialize()?)
    }
}
