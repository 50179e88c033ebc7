//! Append-only record sink
//!
//! Each write opens the target file in append mode, writes one formatted line and
//! closes it again, so there is nothing to flush or close at shutdown.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use chrono::Local;

use super::format::{format_line, render_values};
use super::level::LogLevel;
use crate::error::Result;
use crate::report::ErrorReporter;
use crate::store::{KeyValueStore, LOGGING_ENABLED_KEY};

/// Process-wide "logging enabled" flag, persisted in the key-value store
///
/// Unset means enabled. The store is consulted on every call so a toggle from
/// anywhere takes effect on the very next write.
#[derive(Clone)]
pub struct LoggingSwitch {
    store: Arc<dyn KeyValueStore>,
}

impl LoggingSwitch {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn is_enabled(&self) -> bool {
        self.store
            .get(LOGGING_ENABLED_KEY)
            .map(|value| value != "false")
            .unwrap_or(true)
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<()> {
        self.store
            .set(LOGGING_ENABLED_KEY, if enabled { "true" } else { "false" })
    }
}

/// Writes formatted records for one logger
#[derive(Clone)]
pub struct RecordSink {
    switch: LoggingSwitch,
    reporter: Arc<dyn ErrorReporter>,
    /// Webview loggers never forward errors to the reporter
    report_errors: bool,
}

impl RecordSink {
    pub fn new(switch: LoggingSwitch, reporter: Arc<dyn ErrorReporter>, report_errors: bool) -> Self {
        Self {
            switch,
            reporter,
            report_errors,
        }
    }

    /// Append one record to `path`
    ///
    /// A no-op while logging is disabled. Never fails: I/O errors are traced and
    /// dropped so that logging cannot take down the host.
    pub fn write(&self, level: LogLevel, path: &Path, values: &[&dyn fmt::Debug]) {
        if !self.switch.is_enabled() {
            return;
        }

        let message = render_values(values);
        let line = format_line(Local::now(), level, &message);

        if let Err(e) = append_line(path, &line) {
            tracing::warn!("Failed to write log record to {}: {}", path.display(), e);
        }

        if level.is_reportable() && self.report_errors {
            self.reporter.report(&message);
        }
    }
}

fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())
}
