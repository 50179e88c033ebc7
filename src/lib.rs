//! Sessionlog - per-session log files for multi-process desktop applications
//!
//! Each application run gets its own session directory; every process role
//! writes to its own file inside it. Old sessions are pruned automatically and
//! recent ones can be bundled into a single archive for support diagnostics.

pub mod config;
pub mod error;
pub mod logging;
pub mod report;
pub mod store;

pub use error::{LogError, Result};
pub use logging::{LogEngine, LogLevel, Logger, LoggerOptions, ProcessRole};
pub use report::{ErrorReporter, NoopReporter, TracingReporter};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
