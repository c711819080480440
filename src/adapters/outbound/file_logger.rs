use crate::domains::logger::{DynLogger, FileLogger};
use std::sync::Arc;

/// Install the file backend and return a status logger writing to it.
pub fn init_file_logger(path: &str, level: log::LevelFilter) -> Result<DynLogger, String> {
    let logger = FileLogger::init(path, level)
        .map_err(|e| format!("Failed to initialize status log {}: {}", path, e))?;
    Ok(Arc::new(logger))
}
