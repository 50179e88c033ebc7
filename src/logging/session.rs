//! Log session identity
//!
//! A session is one run of the application. Its id names the directory that
//! holds every log file written during that run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Local;

use crate::error::Result;
use crate::store::{KeyValueStore, CURRENT_SESSION_KEY};

/// Generate a session id from the local wall clock, e.g. `2026-01-21_14-30-45`
///
/// Unique at second granularity and safe as a single path segment.
pub fn new_session_id() -> String {
    Local::now().format("%Y-%m-%d_%H-%M-%S").to_string()
}

/// Holder of the current session pointer
///
/// The pointer is persisted through the key-value store so that renderer
/// processes sharing the store write into the coordinator's session. Within one
/// process, only the first coordinator-role request mints a fresh session.
pub struct SessionContext {
    store: Arc<dyn KeyValueStore>,
    coordinator_started: AtomicBool,
}

impl SessionContext {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            coordinator_started: AtomicBool::new(false),
        }
    }

    /// Current session id, if one has been set
    pub fn current(&self) -> Option<String> {
        self.store
            .get(CURRENT_SESSION_KEY)
            .filter(|id| !id.is_empty())
    }

    /// Session for a coordinator-role logger
    ///
    /// Mints a new session the first time it is called on this context and
    /// reuses the pointer afterwards.
    pub fn start_coordinator(&self) -> Result<String> {
        if !self.coordinator_started.swap(true, Ordering::SeqCst) {
            return self.start_new();
        }
        self.current_or_create()
    }

    /// Session for any other logger: the existing pointer, or a new one if unset
    pub fn current_or_create(&self) -> Result<String> {
        match self.current() {
            Some(id) => Ok(id),
            None => self.start_new(),
        }
    }

    fn start_new(&self) -> Result<String> {
        let id = new_session_id();
        self.store.set(CURRENT_SESSION_KEY, &id)?;
        tracing::info!("Started log session {}", id);
        Ok(id)
    }
}
