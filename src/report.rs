//! Error-reporting sinks
//!
//! Error-level records are forwarded to an [`ErrorReporter`] supplied by the host,
//! typically a crash-reporting client.

/// Capability to forward a severe event to an external reporting service
pub trait ErrorReporter: Send + Sync {
    fn report(&self, message: &str);
}

/// Reporter that emits each report as a tracing event with target `crash_report`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, message: &str) {
        tracing::error!(target: "crash_report", "{}", message);
    }
}

/// Reporter that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ErrorReporter for NoopReporter {
    fn report(&self, _message: &str) {}
}
