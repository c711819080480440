use crate::domains::logger::{DomainLogger, DynLogger};
use std::sync::Arc;

struct Discard;

impl DomainLogger for Discard {
    fn info(&self, _msg: &str) {}
    fn warn(&self, _msg: &str) {}
    fn error(&self, _msg: &str) {}
}

/// Drops every status line; the default in tests.
pub fn init_noop_logger() -> DynLogger {
    Arc::new(Discard)
}
