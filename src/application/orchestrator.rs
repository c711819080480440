use super::monitor_service::{DeviceEndpoints, DeviceHandle, DeviceMonitorService};
use crate::adapters::inbound::{RequestPool, RobotHttpClient, WsTopicTransport};
use crate::common::{ApplicationError, ApplicationResult};
use crate::config::Config;
use crate::domains::arrival::{ArrivalEvent, DeviceStatus};
use crate::domains::logger::DynLogger;
use futures_util::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Runs one independent monitor per robot address.
///
/// Devices share only the HTTP client and the request pool, whose capacity
/// grows with the number of devices.
pub struct MonitorOrchestrator {
    pool: RequestPool,
    devices: BTreeMap<String, DeviceHandle>,
}

impl MonitorOrchestrator {
    pub async fn start(
        config: &Config,
        addresses: Vec<String>,
        logger: DynLogger,
    ) -> ApplicationResult<Self> {
        let mut unique = addresses;
        unique.sort();
        unique.dedup();

        let client = reqwest::Client::builder()
            .timeout(config.robot.request_timeout())
            .build()
            .map_err(|e| ApplicationError::Configuration(e.into()))?;
        let pool = RequestPool::for_devices(unique.len(), config.pool.permits_per_device);
        tracing::info!(
            devices = unique.len(),
            pool_capacity = pool.capacity(),
            "Starting arrival monitors"
        );

        let clients: Vec<(String, RobotHttpClient)> = unique
            .into_iter()
            .map(|address| {
                let http = RobotHttpClient::for_device(
                    &address,
                    config.robot.port,
                    client.clone(),
                    pool.clone(),
                );
                (address, http)
            })
            .collect();
        // Probed together so unreachable robots cost one request timeout, not one each.
        let serial_numbers =
            join_all(clients.iter().map(|(address, http)| probe_serial_number(address, http))).await;

        let mut devices = BTreeMap::new();
        for ((address, http), serial_number) in clients.into_iter().zip(serial_numbers) {
            let http = Arc::new(http);
            let endpoints = DeviceEndpoints {
                ledger: http.clone(),
                maps: http,
                topics: Arc::new(WsTopicTransport::for_device(&address, config.robot.port)),
            };
            let handle = DeviceMonitorService::spawn(
                address.clone(),
                serial_number,
                &config.monitor,
                config.waypoints.match_policy,
                endpoints,
                logger.clone(),
            );
            devices.insert(address, handle);
        }

        Ok(Self { pool, devices })
    }

    pub fn pool(&self) -> &RequestPool {
        &self.pool
    }

    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.devices.keys().map(String::as_str)
    }

    pub fn status(&self, address: &str) -> Option<DeviceStatus> {
        self.devices.get(address).map(DeviceHandle::status)
    }

    /// Device address → latest status, for every monitored device.
    pub fn snapshot(&self) -> BTreeMap<String, DeviceStatus> {
        self.devices
            .iter()
            .map(|(address, handle)| (address.clone(), handle.status()))
            .collect()
    }

    pub fn subscribe(&self, address: &str) -> Option<broadcast::Receiver<ArrivalEvent>> {
        self.devices.get(address).map(DeviceHandle::subscribe)
    }

    pub fn shutdown(self) {
        for (address, handle) in &self.devices {
            tracing::info!(device = %address, "Stopping device monitor");
            handle.shutdown();
        }
    }
}

async fn probe_serial_number(address: &str, http: &RobotHttpClient) -> Option<String> {
    match http.device_info().await {
        Ok(info) => info.sn,
        Err(e) => {
            tracing::warn!(device = %address, "Device info unavailable: {}", e);
            None
        }
    }
}
