//! Shared log engine
//!
//! One engine per process owns the logs root, the retention window, the session
//! pointer and the enable switch. Loggers hold an `Arc` to it and forward the
//! bulk operations here.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use super::archive::{self, ArchiveReport};
use super::file_writer::LoggingSwitch;
use super::paths::ProcessRole;
use super::retention::{self, default_retention, expiry_cutoff, PruneReport, SessionEntry};
use super::session::SessionContext;
use crate::error::{LogError, Result};
use crate::report::ErrorReporter;
use crate::store::KeyValueStore;

pub struct LogEngine {
    logs_root: PathBuf,
    retention: Duration,
    role: ProcessRole,
    sessions: SessionContext,
    switch: LoggingSwitch,
    reporter: Arc<dyn ErrorReporter>,
    pending_prunes: Mutex<Vec<JoinHandle<()>>>,
}

impl LogEngine {
    /// Create an engine for the process running as `role`
    ///
    /// `logs_root` is the `{app}-logs` directory; it is created on first logger
    /// construction, not here.
    pub fn new(
        logs_root: PathBuf,
        role: ProcessRole,
        store: Arc<dyn KeyValueStore>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            logs_root,
            retention: default_retention(),
            role,
            sessions: SessionContext::new(Arc::clone(&store)),
            switch: LoggingSwitch::new(store),
            reporter,
            pending_prunes: Mutex::new(Vec::new()),
        }
    }

    /// Override the retention window (default 7 days)
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    pub fn logs_root(&self) -> &Path {
        &self.logs_root
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Role of the host process, used when a logger does not name one
    pub fn role(&self) -> &ProcessRole {
        &self.role
    }

    pub fn sessions(&self) -> &SessionContext {
        &self.sessions
    }

    pub fn switch(&self) -> &LoggingSwitch {
        &self.switch
    }

    pub fn reporter(&self) -> Arc<dyn ErrorReporter> {
        Arc::clone(&self.reporter)
    }

    /// Create the logs root if it is missing
    pub fn ensure_root(&self) -> Result<()> {
        std::fs::create_dir_all(&self.logs_root).map_err(|source| LogError::CreateDir {
            path: self.logs_root.clone(),
            source,
        })
    }

    /// Session a logger of `role` writes into
    ///
    /// The first coordinator logger of the process starts a new session; every
    /// other logger joins the current one.
    pub fn session_for(&self, role: &ProcessRole) -> Result<String> {
        match role {
            ProcessRole::Main => self.sessions.start_coordinator(),
            _ => self.sessions.current_or_create(),
        }
    }

    /// Cutoff separating recent sessions from expired ones, as of now
    pub fn expiry_cutoff(&self) -> DateTime<Utc> {
        expiry_cutoff(self.retention)
    }

    /// Sessions under the logs root with their creation times
    pub async fn list_sessions(&self) -> Result<Vec<SessionEntry>> {
        retention::classify(&self.logs_root).await
    }

    /// Delete sessions created before `cutoff`, or outside the retention window
    pub async fn prune_older_than(&self, cutoff: Option<DateTime<Utc>>) -> Result<PruneReport> {
        let cutoff = cutoff.unwrap_or_else(|| self.expiry_cutoff());
        retention::prune_sessions(&self.logs_root, cutoff).await
    }

    /// Start a background prune pass with the default cutoff
    ///
    /// Callers are not blocked. A short-lived process should call
    /// [`LogEngine::wait_for_prune`] before its runtime shuts down, otherwise the
    /// pass is cancelled part way. Does nothing outside a tokio runtime.
    pub fn spawn_prune(&self) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::debug!("No async runtime; skipping startup prune");
                return;
            }
        };

        let root = self.logs_root.clone();
        let cutoff = self.expiry_cutoff();
        let task = handle.spawn(async move {
            if let Err(e) = retention::prune_sessions(&root, cutoff).await {
                tracing::warn!("Startup prune of {} failed: {}", root.display(), e);
            }
        });

        match self.pending_prunes.lock() {
            Ok(mut pending) => {
                pending.retain(|t| !t.is_finished());
                pending.push(task);
            }
            Err(_) => tracing::warn!("Prune task list poisoned; startup prune not tracked"),
        }
    }

    /// Wait for every prune pass started by [`LogEngine::spawn_prune`]
    pub async fn wait_for_prune(&self) {
        let tasks = match self.pending_prunes.lock() {
            Ok(mut pending) => std::mem::take(&mut *pending),
            Err(_) => return,
        };
        for task in tasks {
            if let Err(e) = task.await {
                tracing::warn!("Startup prune task failed: {}", e);
            }
        }
    }

    /// Bundle the logs of every session inside the retention window
    pub async fn build_archive(&self) -> Result<ArchiveReport> {
        archive::build_archive(&self.logs_root, self.retention).await
    }

    /// Delete a bundle produced by [`LogEngine::build_archive`]
    pub async fn clear_archive(&self, path: &Path) -> Result<()> {
        archive::clear_archive(path).await
    }

    pub fn enable_logging(&self) -> Result<String> {
        self.switch.set_enabled(true)?;
        Ok("Logging enabled".to_string())
    }

    pub fn disable_logging(&self) -> Result<String> {
        self.switch.set_enabled(false)?;
        Ok("Logging disabled".to_string())
    }
}
