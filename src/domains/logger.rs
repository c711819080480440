use std::sync::Arc;

/// Sink for human-readable device status lines (Hexagonal port).
/// Non-fallible from the domain perspective: a broken sink never stops monitoring.
pub trait DomainLogger: Send + Sync + 'static {
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
}

pub type DynLogger = Arc<dyn DomainLogger>;

pub const STATUS_LOG_TARGET: &str = "arrival_status";

/// Status lines appended to a file through the `log` facade, backed by `fast_log`.
pub struct FileLogger {
    path: String,
}

impl FileLogger {
    /// Install `fast_log` as the process-wide `log` backend writing to `path`.
    /// Can only succeed once per process.
    pub fn init(path: &str, level: log::LevelFilter) -> Result<Self, Box<dyn std::error::Error>> {
        fast_log::init(fast_log::config::Config::new().file(path).level(level))?;
        Ok(Self {
            path: path.to_string(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl DomainLogger for FileLogger {
    fn info(&self, msg: &str) {
        log::info!(target: STATUS_LOG_TARGET, "{} - {}", chrono::Utc::now().to_rfc3339(), msg);
    }

    fn warn(&self, msg: &str) {
        log::warn!(target: STATUS_LOG_TARGET, "{} - {}", chrono::Utc::now().to_rfc3339(), msg);
    }

    fn error(&self, msg: &str) {
        log::error!(target: STATUS_LOG_TARGET, "{} - {}", chrono::Utc::now().to_rfc3339(), msg);
    }
}
