//! Log file naming and path resolution
//!
//! Structure: `{logs_root}/{session_id}/{file_name}` where the file name depends
//! on the process role:
//!   main process            -> `main.log`
//!   renderer                -> `renderer.log`
//!   renderer sub-log        -> `{domain}.log`
//!   anything else           -> `default.log`
//! A custom prefix turns `main.log` into `{prefix}-main.log`.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{LogError, Result};

/// Domain label used for sub-logs when none is given
pub const DEFAULT_DOMAIN: &str = "webview";

/// Kind of process a logger belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessRole {
    /// Coordinator process; owns session creation
    Main,
    /// UI/renderer process
    Renderer,
    /// Unrecognized role
    Other(String),
}

impl ProcessRole {
    pub fn as_str(&self) -> &str {
        match self {
            ProcessRole::Main => "main",
            ProcessRole::Renderer => "renderer",
            ProcessRole::Other(name) => name.as_str(),
        }
    }
}

impl fmt::Display for ProcessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessRole {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "main" | "browser" => ProcessRole::Main,
            "renderer" => ProcessRole::Renderer,
            other => ProcessRole::Other(other.to_string()),
        })
    }
}

/// Everything that decides a logger's file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTarget {
    pub role: ProcessRole,
    /// Renderer sub-log (webview) flag
    pub is_sub_log: bool,
    pub domain: String,
    /// Optional prefix prepended to the file name
    pub custom_prefix: Option<String>,
}

impl LogTarget {
    pub fn new(role: ProcessRole) -> Self {
        Self {
            role,
            is_sub_log: false,
            domain: DEFAULT_DOMAIN.to_string(),
            custom_prefix: None,
        }
    }

    /// File name for this target, e.g. `main.log` or `crash-A.log`
    pub fn file_name(&self) -> String {
        let base = match &self.role {
            ProcessRole::Renderer if self.is_sub_log => {
                let domain = if self.domain.is_empty() {
                    DEFAULT_DOMAIN
                } else {
                    self.domain.as_str()
                };
                format!("{}.log", domain)
            }
            ProcessRole::Renderer => "renderer.log".to_string(),
            ProcessRole::Main => "main.log".to_string(),
            ProcessRole::Other(_) => "default.log".to_string(),
        };

        match self.custom_prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => format!("{}-{}", prefix, base),
            _ => base,
        }
    }
}

/// Path of the directory holding one session's log files
pub fn session_dir(logs_root: &Path, session_id: &str) -> PathBuf {
    logs_root.join(session_id)
}

/// Build the log file path for a target and make sure its directory exists
///
/// Directory creation is idempotent; a failure is returned to the caller since
/// nothing can be logged without it.
pub fn resolve_path(logs_root: &Path, session_id: &str, target: &LogTarget) -> Result<PathBuf> {
    let dir = session_dir(logs_root, session_id);
    fs::create_dir_all(&dir).map_err(|source| LogError::CreateDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir.join(target.file_name()))
}
