use arrival_monitor::adapters::outbound::multi_logger::init_status_logger;
use arrival_monitor::application::MonitorOrchestrator;
use arrival_monitor::Config;
use std::error::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "ARRIVAL_CONFIG";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config_path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| "config.toml".to_string());
    let config = Config::load(Some(&config_path))?;

    // Installed directly rather than via `init()` so the `log` facade stays
    // free for the fast_log status file.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting arrival monitor");
    info!(config = %config_path, devices = ?config.robot.devices, "Configuration loaded");

    let logger = init_status_logger(
        config.logging.status_file.as_deref(),
        config.logging.level_filter(),
    );

    if config.robot.devices.is_empty() {
        warn!("No devices configured; set robot.devices or ARRIVAL__ROBOT__DEVICES");
    }

    let orchestrator =
        MonitorOrchestrator::start(&config, config.robot.devices.clone(), logger).await?;
    info!(
        devices = orchestrator.addresses().count(),
        "Arrival monitor started"
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutting down arrival monitor");
    orchestrator.shutdown();

    Ok(())
}
