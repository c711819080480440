use arrival_monitor::adapters::inbound::WsTopicTransport;
use arrival_monitor::common::{MonitorError, MonitorResult};
use arrival_monitor::domains::arrival::MonitorInput;
use arrival_monitor::domains::geometry::Position2D;
use arrival_monitor::domains::pose_stream::*;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// Transport that refuses every connection and counts the attempts.
struct Unreachable {
    attempts: Arc<AtomicUsize>,
}

#[async_trait]
impl TopicTransport for Unreachable {
    async fn connect(&self) -> MonitorResult<Box<dyn TopicConnection>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(MonitorError::Closed)
    }
}

#[tokio::test]
async fn test_client_keeps_reconnecting() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let client = PoseStreamClient::new(
        "robot-1",
        Arc::new(Unreachable {
            attempts: attempts.clone(),
        }),
        DEFAULT_POSE_TOPIC,
        Duration::from_millis(1),
    );
    let (tx, _rx) = mpsc::channel(4);
    let task = tokio::spawn(client.run(tx));

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(attempts.load(Ordering::SeqCst) >= 5);
    assert!(!task.is_finished());
    task.abort();
}

#[tokio::test]
async fn test_client_stops_when_receiver_is_gone() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let client = PoseStreamClient::new(
        "robot-1",
        Arc::new(Unreachable {
            attempts: attempts.clone(),
        }),
        DEFAULT_POSE_TOPIC,
        Duration::from_millis(1),
    );
    let (tx, rx) = mpsc::channel(4);
    drop(rx);

    tokio::time::timeout(Duration::from_secs(1), client.run(tx))
        .await
        .unwrap();
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_websocket_session_subscribes_and_reconnects() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (seen_tx, mut seen_rx) = mpsc::channel::<String>(8);

    tokio::spawn(async move {
        let mut connection = 0;
        loop {
            let (stream, _) = listener.accept().await.unwrap();
            connection += 1;
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            if let Some(Ok(Message::Text(subscribe))) = ws.next().await {
                seen_tx.send(subscribe).await.unwrap();
            }
            if connection == 1 {
                for frame in [
                    r#"{"topic": "/battery_state", "percentage": 0.5}"#,
                    r#"{"topic": "/tracked_pose", "pos": "oops"}"#,
                    r#"{"topic": "/tracked_pose", "pos": [3.5, -1.25], "ori": 1.57}"#,
                ] {
                    ws.send(Message::Text(frame.to_string())).await.unwrap();
                }
                ws.close(None).await.unwrap();
            } else {
                // Hold the second connection open.
                while ws.next().await.is_some() {}
            }
        }
    });

    let transport = WsTopicTransport::new(format!("ws://{}/ws/v2/topics", addr));
    let client = PoseStreamClient::new(
        "robot-1",
        Arc::new(transport),
        DEFAULT_POSE_TOPIC,
        Duration::from_millis(10),
    );
    let (tx, mut rx) = mpsc::channel(8);
    let task = tokio::spawn(client.run(tx));

    let first = tokio::time::timeout(Duration::from_secs(2), seen_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first, r#"{"enable_topic":"/tracked_pose"}"#);

    let input = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .unwrap()
        .unwrap();
    match input {
        MonitorInput::Pose(sample) => assert_eq!(sample.position, Position2D::new(3.5, -1.25)),
        other => panic!("Expected a pose sample, got {:?}", other),
    }

    // The subscription is sent again on the new connection.
    let again = tokio::time::timeout(Duration::from_secs(2), seen_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(again, first);
    assert!(rx.try_recv().is_err());

    task.abort();
}
