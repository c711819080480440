pub mod monitor_service;
pub mod orchestrator;

pub use monitor_service::*;
pub use orchestrator::*;
