use arrival_monitor::adapters::inbound::RequestPool;
use arrival_monitor::adapters::outbound::init_noop_logger;
use arrival_monitor::application::MonitorOrchestrator;
use arrival_monitor::domains::arrival::{Activity, ArrivalStatus};
use arrival_monitor::Config;
use httpmock::{Method::GET, MockServer};
use serde_json::json;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

async fn mock_robot(server: &MockServer) {
    let overlays = json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "name": "Charger" },
                "geometry": { "type": "Point", "coordinates": [-1.0, 0.5] }
            },
            {
                "type": "Feature",
                "properties": { "name": "DeskA" },
                "geometry": { "type": "Point", "coordinates": [0.7875, 7.17] }
            }
        ]
    })
    .to_string();

    server
        .mock_async(|when, then| {
            when.method(GET).path("/device/info");
            then.status(200).json_body(json!({ "device": { "sn": "SN-0042" } }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/chassis/moves");
            then.status(200)
                .json_body(json!([{ "id": 9, "state": "succeeded" }]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/chassis/moves/9");
            then.status(200).json_body(json!({
                "id": 9,
                "state": "succeeded",
                "target_x": 0.78750000,
                "target_y": 7.170000000000001,
                "create_time": chrono::Utc::now().timestamp()
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/chassis/current-map");
            then.status(200).json_body(json!({ "id": 3 }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/maps/3");
            then.status(200).json_body(json!({ "id": 3, "overlays": overlays }));
        })
        .await;
}

fn test_config(port: u16) -> Config {
    let mut config = Config::default();
    config.robot.port = port;
    config.robot.request_timeout_ms = 1000;
    config.monitor.poll_interval_ms = 20;
    config.monitor.reconnect_delay_ms = 50;
    config
}

#[tokio::test]
async fn test_orchestrator_resolves_arrival_waypoint() {
    let server = MockServer::start_async().await;
    mock_robot(&server).await;
    let config = test_config(server.port());

    let orchestrator = assert_ok!(
        MonitorOrchestrator::start(
            &config,
            vec!["127.0.0.1".to_string(), "127.0.0.1".to_string()],
            init_noop_logger(),
        )
        .await
    );
    assert_eq!(orchestrator.addresses().collect::<Vec<_>>(), vec!["127.0.0.1"]);
    assert_eq!(orchestrator.pool().capacity(), config.pool.permits_per_device);

    let status = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let snapshot = orchestrator.snapshot();
            let status = snapshot["127.0.0.1"].clone();
            if status.arrival_status == ArrivalStatus::Arrived && status.waypoint.is_some() {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .unwrap();

    assert_eq!(status.waypoint_name(), "DeskA");
    assert_eq!(status.serial_number.as_deref(), Some("SN-0042"));
    assert_eq!(status.activity, Activity::Active);
    assert!(orchestrator.subscribe("127.0.0.1").is_some());
    assert!(orchestrator.status("10.0.0.1").is_none());

    orchestrator.shutdown();
}

#[tokio::test]
async fn test_orchestrator_survives_unreachable_device() {
    let mut config = test_config(1);
    config.robot.request_timeout_ms = 100;

    let orchestrator = assert_ok!(
        MonitorOrchestrator::start(&config, vec!["127.0.0.1".to_string()], init_noop_logger()).await
    );
    let status = orchestrator.status("127.0.0.1").unwrap();
    assert_eq!(status.serial_number, None);
    assert_eq!(status.arrival_status, ArrivalStatus::Moving);
    assert_eq!(status.waypoint_name(), "none");

    orchestrator.shutdown();
}

#[tokio::test]
async fn test_request_pool_grows_with_devices() {
    let pool = RequestPool::for_devices(4, 3);
    assert_eq!(pool.capacity(), 12);

    let permits: Vec<_> = {
        let mut held = Vec::new();
        for _ in 0..12 {
            held.push(assert_ok!(pool.acquire().await));
        }
        held
    };
    assert_eq!(pool.available(), 0);
    assert_err!(tokio::time::timeout(Duration::from_millis(20), pool.acquire()).await);

    drop(permits);
    assert_eq!(pool.available(), 12);
}

#[tokio::test]
async fn test_serial_numbers_are_fetched_concurrently() {
    // Accepts connections on every loopback address but never answers.
    let listener = tokio::net::TcpListener::bind("0.0.0.0:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let silent = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    let mut config = test_config(port);
    config.robot.request_timeout_ms = 300;
    let addresses = vec![
        "127.0.0.1".to_string(),
        "127.0.0.2".to_string(),
        "127.0.0.3".to_string(),
    ];

    let started = std::time::Instant::now();
    let orchestrator =
        assert_ok!(MonitorOrchestrator::start(&config, addresses, init_noop_logger()).await);
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(300));
    assert!(elapsed < Duration::from_millis(750), "took {:?}", elapsed);
    for status in orchestrator.snapshot().values() {
        assert_eq!(status.serial_number, None);
    }

    orchestrator.shutdown();
    silent.abort();
}
