pub mod adapters;
pub mod application;
pub mod common;
pub mod config;
pub mod domains;

pub use crate::config::Config;

// Re-export common types
pub use common::{
    AggregateRoot, ApplicationError, ApplicationResult, DomainEvent, MapId, MonitorError,
    MonitorResult, MoveId,
};

pub use application::MonitorOrchestrator;
