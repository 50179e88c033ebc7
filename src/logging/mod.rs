//! Session log engine
//!
//! Per-session, per-role log files with age-based retention and archive export.
//! Layout on disk:
//!   `{logs_root}/{session_id}/{role file}.log`
//!   `{logs_root}/logs-{epoch_millis}.tar.zst`

mod archive;
mod engine;
mod file_writer;
mod format;
mod level;
mod logger;
mod paths;
mod retention;
mod session;
mod subscriber;

pub use archive::{archive_path, is_archive_path, ArchiveReport, ARCHIVE_SUFFIX};
pub use engine::LogEngine;
pub use file_writer::{LoggingSwitch, RecordSink};
pub use format::{format_line, render_values};
pub use level::LogLevel;
pub use logger::{Logger, LoggerOptions};
pub use paths::{resolve_path, session_dir, LogTarget, ProcessRole, DEFAULT_DOMAIN};
pub use retention::{
    age_of, classify, default_retention, expiry_cutoff, is_session_name, list_sessions,
    prune_sessions, retention_days, PruneReport, SessionEntry, DEFAULT_RETENTION_DAYS,
};
pub use session::{new_session_id, SessionContext};
pub use subscriber::init_diagnostics;
