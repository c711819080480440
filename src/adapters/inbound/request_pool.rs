use crate::common::{MonitorError, MonitorResult};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Bounded pool of in-flight HTTP requests shared by every monitored device.
///
/// Sized per device so that adding robots adds capacity instead of making
/// each robot's poll loop wait on the others.
#[derive(Debug, Clone)]
pub struct RequestPool {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl RequestPool {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn for_devices(devices: usize, permits_per_device: usize) -> Self {
        Self::new(devices.max(1) * permits_per_device.max(1))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Wait for a free slot. The slot is released when the permit is dropped.
    pub async fn acquire(&self) -> MonitorResult<OwnedSemaphorePermit> {
        self.permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| MonitorError::PoolClosed)
    }
}
