use crate::common::MonitorResult;
use crate::domains::pose_stream::{TopicConnection, TopicTransport};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

/// WebSocket topic endpoint of a robot.
pub struct WsTopicTransport {
    url: String,
}

impl WsTopicTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn for_device(host: &str, port: u16) -> Self {
        Self::new(format!("ws://{}:{}/ws/v2/topics", host, port))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TopicTransport for WsTopicTransport {
    async fn connect(&self) -> MonitorResult<Box<dyn TopicConnection>> {
        let (stream, _) = connect_async(self.url.as_str()).await?;
        tracing::debug!(url = %self.url, "Topic stream connected");
        Ok(Box::new(WsTopicConnection { stream }))
    }
}

struct WsTopicConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl TopicConnection for WsTopicConnection {
    async fn send_text(&mut self, text: String) -> MonitorResult<()> {
        self.stream.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn next_text(&mut self) -> Option<MonitorResult<String>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Close(_)) => return None,
                // Pings are answered by tungstenite itself.
                Ok(_) => continue,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}
