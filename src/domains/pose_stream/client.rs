use super::ports::TopicTransport;
use super::types::{parse_pose_frame, subscription_message};
use crate::common::MonitorResult;
use crate::domains::arrival::MonitorInput;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// How a single connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The peer closed the stream; reconnect.
    Closed,
    /// Nobody is listening for samples any more; stop.
    ReceiverGone,
}

/// Keeps a pose subscription alive for one device, reconnecting forever.
pub struct PoseStreamClient {
    device: String,
    transport: Arc<dyn TopicTransport>,
    topic: String,
    reconnect_delay: Duration,
}

impl PoseStreamClient {
    pub fn new(
        device: impl Into<String>,
        transport: Arc<dyn TopicTransport>,
        topic: impl Into<String>,
        reconnect_delay: Duration,
    ) -> Self {
        Self {
            device: device.into(),
            transport,
            topic: topic.into(),
            reconnect_delay,
        }
    }

    /// Connect, subscribe and forward samples until the connection fails, then
    /// start over after `reconnect_delay`. There is no retry ceiling.
    pub async fn run(self, tx: mpsc::Sender<MonitorInput>) {
        let mut attempt: u64 = 0;
        loop {
            attempt += 1;
            tracing::info!(device = %self.device, attempt, "Connecting to pose stream");
            match self.session(&tx).await {
                Ok(SessionEnd::ReceiverGone) => break,
                Ok(SessionEnd::Closed) => {
                    tracing::warn!(device = %self.device, "Pose stream closed");
                }
                Err(e) => {
                    tracing::warn!(device = %self.device, "Pose stream failed: {}", e);
                }
            }
            if tx.is_closed() {
                break;
            }
            tokio::time::sleep(self.reconnect_delay).await;
        }
        tracing::debug!(device = %self.device, "Pose stream client stopped");
    }

    /// A single connection lifetime. Subscription state is re-sent on every new connection.
    pub async fn session(&self, tx: &mpsc::Sender<MonitorInput>) -> MonitorResult<SessionEnd> {
        let mut connection = self.transport.connect().await?;
        connection.send_text(subscription_message(&self.topic)?).await?;
        tracing::info!(device = %self.device, topic = %self.topic, "Subscribed to pose topic");

        while let Some(frame) = connection.next_text().await {
            let text = frame?;
            match parse_pose_frame(&text, &self.topic) {
                Ok(Some(sample)) => {
                    if tx.send(MonitorInput::Pose(sample)).await.is_err() {
                        return Ok(SessionEnd::ReceiverGone);
                    }
                }
                Ok(None) => {
                    tracing::trace!(device = %self.device, "Ignoring frame for another topic");
                }
                Err(e) => {
                    tracing::warn!(device = %self.device, "Dropping pose frame: {}", e);
                }
            }
        }
        Ok(SessionEnd::Closed)
    }
}
