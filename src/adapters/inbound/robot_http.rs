use super::request_pool::RequestPool;
use crate::common::{MapId, MonitorError, MonitorResult, MoveId};
use crate::domains::move_tracking::{MoveLedger, MoveRecord};
use crate::domains::waypoint::MapSource;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

pub const DEFAULT_ROBOT_PORT: u16 = 8090;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeviceInfo {
    #[serde(default)]
    pub sn: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeviceInfoResponse {
    device: DeviceInfo,
}

#[derive(Debug, Deserialize)]
struct CurrentMap {
    id: MapId,
}

/// HTTP adapter for one robot's REST API. Every request holds a permit from
/// the shared [`RequestPool`] while in flight.
#[derive(Clone)]
pub struct RobotHttpClient {
    base_url: String,
    client: Client,
    pool: RequestPool,
}

impl RobotHttpClient {
    pub fn new(base_url: impl Into<String>, client: Client, pool: RequestPool) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client,
            pool,
        }
    }

    pub fn for_device(host: &str, port: u16, client: Client, pool: RequestPool) -> Self {
        Self::new(format!("http://{}:{}", host, port), client, pool)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Body of a successful GET, `None` on 404.
    async fn get_optional(&self, path: &str) -> MonitorResult<Option<String>> {
        let _permit = self.pool.acquire().await?;
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(MonitorError::UnexpectedStatus {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(Some(response.text().await?))
    }

    async fn get_required(&self, path: &str) -> MonitorResult<String> {
        self.get_optional(path)
            .await?
            .ok_or_else(|| MonitorError::UnexpectedStatus {
                path: path.to_string(),
                status: StatusCode::NOT_FOUND.as_u16(),
            })
    }

    pub async fn device_info(&self) -> MonitorResult<DeviceInfo> {
        let body = self.get_required("/device/info").await?;
        let response: DeviceInfoResponse = serde_json::from_str(&body)?;
        Ok(response.device)
    }
}

#[async_trait]
impl MoveLedger for RobotHttpClient {
    async fn latest_move(&self) -> MonitorResult<Option<MoveRecord>> {
        let body = self.get_required("/chassis/moves").await?;
        // Newest first; only the head entry has to be well formed.
        let moves: Vec<serde_json::Value> = serde_json::from_str(&body)?;
        match moves.into_iter().next() {
            Some(latest) => Ok(Some(serde_json::from_value(latest)?)),
            None => Ok(None),
        }
    }

    async fn move_details(&self, id: &MoveId) -> MonitorResult<Option<MoveRecord>> {
        match self.get_optional(&format!("/chassis/moves/{}", id)).await? {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl MapSource for RobotHttpClient {
    async fn current_map_id(&self) -> MonitorResult<MapId> {
        let body = self.get_required("/chassis/current-map").await?;
        let current: CurrentMap = serde_json::from_str(&body)?;
        Ok(current.id)
    }

    async fn map_document(&self, id: &MapId) -> MonitorResult<String> {
        self.get_required(&format!("/maps/{}", id)).await
    }
}
