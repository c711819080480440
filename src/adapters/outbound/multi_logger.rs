use crate::domains::logger::{DomainLogger, DynLogger};
use std::sync::Arc;

/// Forwards every status line to each of its sinks in order.
pub struct MultiLogger {
    sinks: Vec<DynLogger>,
}

impl MultiLogger {
    pub fn new(sinks: Vec<DynLogger>) -> Self {
        Self { sinks }
    }
}

impl DomainLogger for MultiLogger {
    fn info(&self, msg: &str) {
        self.sinks.iter().for_each(|s| s.info(msg));
    }

    fn warn(&self, msg: &str) {
        self.sinks.iter().for_each(|s| s.warn(msg));
    }

    fn error(&self, msg: &str) {
        self.sinks.iter().for_each(|s| s.error(msg));
    }
}

/// Console status logger, plus a status file when `path` is given and can be opened.
pub fn init_status_logger(path: Option<&str>, level: log::LevelFilter) -> DynLogger {
    let console = crate::adapters::outbound::init_console_logger();
    let Some(path) = path else {
        return console;
    };
    match crate::adapters::outbound::init_file_logger(path, level) {
        Ok(file) => Arc::new(MultiLogger::new(vec![file, console])),
        Err(e) => {
            tracing::warn!("{}; status lines go to the console only", e);
            console
        }
    }
}
