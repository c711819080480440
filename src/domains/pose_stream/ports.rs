use crate::common::MonitorResult;
use async_trait::async_trait;

/// Opens topic subscriptions on the robot's streaming endpoint.
#[async_trait]
pub trait TopicTransport: Send + Sync {
    async fn connect(&self) -> MonitorResult<Box<dyn TopicConnection>>;
}

/// One live connection. Dropping it closes the connection.
#[async_trait]
pub trait TopicConnection: Send {
    async fn send_text(&mut self, text: String) -> MonitorResult<()>;

    /// Next text frame; `None` once the peer has closed the connection.
    async fn next_text(&mut self) -> Option<MonitorResult<String>>;
}
