use crate::domains::logger::{DomainLogger, DynLogger};
use std::sync::Arc;

/// Status lines on stdout, warnings and errors on stderr.
struct ConsoleStatusLogger;

impl DomainLogger for ConsoleStatusLogger {
    fn info(&self, msg: &str) {
        println!("{}", msg);
    }

    fn warn(&self, msg: &str) {
        eprintln!("WARN: {}", msg);
    }

    fn error(&self, msg: &str) {
        eprintln!("ERROR: {}", msg);
    }
}

pub fn init_console_logger() -> DynLogger {
    Arc::new(ConsoleStatusLogger)
}
