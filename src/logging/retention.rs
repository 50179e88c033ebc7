//! Session retention
//!
//! Classifies session directories under the logs root by creation time and
//! removes the ones that have expired.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::fs;

use super::archive::ARCHIVE_SUFFIX;
use crate::error::{LogError, Result};

/// Default retention period in days
pub const DEFAULT_RETENTION_DAYS: u64 = 7;

/// Default retention window
pub fn default_retention() -> Duration {
    retention_days(DEFAULT_RETENTION_DAYS)
}

/// Retention window spanning `days` days
pub fn retention_days(days: u64) -> Duration {
    Duration::from_secs(days * 24 * 60 * 60)
}

/// Oldest creation time still inside a retention window ending now
pub fn expiry_cutoff(window: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(window)
        .ok()
        .and_then(|window| Utc::now().checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// One session directory and its creation time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEntry {
    pub name: String,
    pub path: PathBuf,
    pub created: DateTime<Utc>,
}

impl SessionEntry {
    /// Inside the window that starts at `cutoff`: kept and archived
    pub fn is_recent(&self, cutoff: DateTime<Utc>) -> bool {
        self.created >= cutoff
    }

    /// Older than `cutoff`: eligible for deletion
    pub fn is_expired(&self, cutoff: DateTime<Utc>) -> bool {
        self.created < cutoff
    }
}

/// Whether a root entry can be a session (not hidden, not an archive bundle)
pub fn is_session_name(name: &str) -> bool {
    !name.starts_with('.') && !name.ends_with(ARCHIVE_SUFFIX)
}

/// List the session names under `logs_root`, sorted
///
/// A missing root is an empty listing.
pub async fn list_sessions(logs_root: &Path) -> Result<Vec<String>> {
    let read_dir_err = |source| LogError::ReadDir {
        path: logs_root.to_path_buf(),
        source,
    };

    let mut entries = match fs::read_dir(logs_root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(read_dir_err(e)),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_dir_err)? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_session_name(&name) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Creation time of a session directory
///
/// Fails when the platform cannot report a birth time; callers abort rather
/// than guess an age.
pub async fn age_of(logs_root: &Path, session: &str) -> Result<DateTime<Utc>> {
    let path = logs_root.join(session);
    let birth_time_err = |source| LogError::BirthTime {
        path: path.clone(),
        source,
    };

    let metadata = fs::metadata(&path).await.map_err(birth_time_err)?;
    let created = metadata.created().map_err(birth_time_err)?;
    Ok(created.into())
}

/// List sessions together with their creation times
///
/// A session that disappears between listing and stat (a concurrent prune) is
/// left out; any other stat failure aborts.
pub async fn classify(logs_root: &Path) -> Result<Vec<SessionEntry>> {
    let mut sessions = Vec::new();
    for name in list_sessions(logs_root).await? {
        let created = match age_of(logs_root, &name).await {
            Ok(created) => created,
            Err(LogError::BirthTime { source, .. }) if source.kind() == ErrorKind::NotFound => {
                tracing::debug!("Session {} vanished before it could be classified", name);
                continue;
            }
            Err(e) => return Err(e),
        };
        sessions.push(SessionEntry {
            path: logs_root.join(&name),
            name,
            created,
        });
    }
    Ok(sessions)
}

/// Outcome of a prune pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub cutoff: Option<DateTime<Utc>>,
    /// Sessions deleted
    pub removed: Vec<String>,
    /// Sessions that could not be deleted, with the reason
    pub failed: Vec<(String, String)>,
}

impl PruneReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for PruneReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.removed.is_empty() && self.failed.is_empty() {
            return write!(f, "No expired log sessions to remove");
        }
        write!(f, "Removed {} expired log session(s)", self.removed.len())?;
        if !self.failed.is_empty() {
            write!(f, ", {} could not be removed", self.failed.len())?;
        }
        Ok(())
    }
}

/// Delete every session created before `cutoff`
///
/// Listing and stat failures abort the pass. A session that cannot be deleted
/// is recorded in the report and the pass moves on.
pub async fn prune_sessions(logs_root: &Path, cutoff: DateTime<Utc>) -> Result<PruneReport> {
    let mut report = PruneReport {
        cutoff: Some(cutoff),
        ..PruneReport::default()
    };

    for session in classify(logs_root).await? {
        if !session.is_expired(cutoff) {
            continue;
        }

        match fs::remove_dir_all(&session.path).await {
            Ok(()) => {
                tracing::debug!("Removed expired log session {}", session.name);
                report.removed.push(session.name);
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                report.removed.push(session.name);
            }
            Err(e) => {
                tracing::warn!("Failed to remove log session {}: {}", session.name, e);
                report.failed.push((session.name, e.to_string()));
            }
        }
    }

    if !report.removed.is_empty() {
        tracing::info!("{}", report);
    }
    Ok(report)
}
