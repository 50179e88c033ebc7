//! Logger facade
//!
//! A [`Logger`] is bound to one log file for its whole life. Construction runs
//! the startup work (root directory, background prune, path resolution)
//! synchronously; after that only the leveled calls touch the file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::archive::ArchiveReport;
use super::engine::LogEngine;
use super::file_writer::RecordSink;
use super::level::LogLevel;
use super::paths::{resolve_path, LogTarget, ProcessRole, DEFAULT_DOMAIN};
use super::retention::PruneReport;
use crate::error::Result;

/// Options recognized by [`Logger::new`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerOptions {
    /// Prefix prepended to the file name
    pub file_name: Option<String>,
    /// Webview sub-log: writes to `{domain}.log` and never reports errors
    pub is_webview: bool,
    /// Sub-log label, used when `is_webview` is set
    pub domain: String,
    /// Process role; the engine's role when unset
    pub role: Option<ProcessRole>,
    /// Write into the current session even for a coordinator role
    ///
    /// For short-lived helpers that log on behalf of a running application. A
    /// session is still created when none exists yet.
    pub join_session: bool,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            file_name: None,
            is_webview: false,
            domain: DEFAULT_DOMAIN.to_string(),
            role: None,
            join_session: false,
        }
    }
}

impl LoggerOptions {
    pub fn role(mut self, role: ProcessRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn webview(mut self, domain: impl Into<String>) -> Self {
        self.is_webview = true;
        self.domain = domain.into();
        self
    }

    pub fn file_name(mut self, prefix: impl Into<String>) -> Self {
        self.file_name = Some(prefix.into());
        self
    }

    pub fn join_session(mut self) -> Self {
        self.join_session = true;
        self
    }
}

/// Per-instance logger writing to one file of the current session
pub struct Logger {
    engine: Arc<LogEngine>,
    path: PathBuf,
    sink: RecordSink,
    is_webview: bool,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("path", &self.path)
            .field("is_webview", &self.is_webview)
            .finish()
    }
}

impl Logger {
    /// Build a logger and resolve its file
    ///
    /// Fails when the logs root or the session directory cannot be created.
    pub fn new(engine: Arc<LogEngine>, options: LoggerOptions) -> Result<Self> {
        engine.ensure_root()?;
        engine.spawn_prune();

        let role = options.role.unwrap_or_else(|| engine.role().clone());
        let session_id = if options.join_session {
            engine.sessions().current_or_create()?
        } else {
            engine.session_for(&role)?
        };
        let target = LogTarget {
            role,
            is_sub_log: options.is_webview,
            domain: options.domain,
            custom_prefix: options.file_name,
        };
        let path = resolve_path(engine.logs_root(), &session_id, &target)?;

        let sink = RecordSink::new(
            engine.switch().clone(),
            engine.reporter(),
            !options.is_webview,
        );

        tracing::debug!("Logger bound to {}", path.display());

        Ok(Self {
            engine,
            path,
            sink,
            is_webview: options.is_webview,
        })
    }

    /// Path of the file this logger appends to
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_webview(&self) -> bool {
        self.is_webview
    }

    pub fn engine(&self) -> &Arc<LogEngine> {
        &self.engine
    }

    pub fn write(&self, level: LogLevel, values: &[&dyn fmt::Debug]) {
        self.sink.write(level, &self.path, values);
    }

    pub fn debug(&self, values: &[&dyn fmt::Debug]) {
        self.write(LogLevel::Debug, values);
    }

    pub fn log(&self, values: &[&dyn fmt::Debug]) {
        self.write(LogLevel::Log, values);
    }

    pub fn info(&self, values: &[&dyn fmt::Debug]) {
        self.write(LogLevel::Info, values);
    }

    pub fn warn(&self, values: &[&dyn fmt::Debug]) {
        self.write(LogLevel::Warn, values);
    }

    /// Write an error record and, unless this is a webview logger, report it
    pub fn error(&self, values: &[&dyn fmt::Debug]) {
        self.write(LogLevel::Error, values);
    }

    /// Delete every session older than `cutoff` (default: the retention window)
    pub async fn prune_old_logs(&self, cutoff: Option<DateTime<Utc>>) -> Result<PruneReport> {
        self.engine.prune_older_than(cutoff).await
    }

    /// Bundle all recent sessions into one archive in the logs root
    pub async fn get_log_archive(&self) -> Result<ArchiveReport> {
        self.engine.build_archive().await
    }

    pub async fn clear_log_archive(&self, path: &Path) -> Result<()> {
        self.engine.clear_archive(path).await
    }

    pub fn enable_logging(&self) -> Result<String> {
        self.engine.enable_logging()
    }

    pub fn disable_logging(&self) -> Result<String> {
        self.engine.disable_logging()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LogError;
    use crate::report::ErrorReporter;
    use crate::store::{KeyValueStore, MemoryStore, CURRENT_SESSION_KEY};
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingReporter {
        reports: Mutex<Vec<String>>,
    }

    impl ErrorReporter for RecordingReporter {
        fn report(&self, message: &str) {
            self.reports.lock().unwrap().push(message.to_string());
        }
    }

    impl RecordingReporter {
        fn count(&self) -> usize {
            self.reports.lock().unwrap().len()
        }
    }

    fn engine_with(root: &Path, role: ProcessRole, reporter: Arc<RecordingReporter>) -> Arc<LogEngine> {
        Arc::new(LogEngine::new(
            root.join("app-logs"),
            role,
            Arc::new(MemoryStore::new()),
            reporter,
        ))
    }

    fn engine(root: &Path) -> Arc<LogEngine> {
        engine_with(root, ProcessRole::Main, Arc::default())
    }

    #[test]
    fn test_main_logger_path() {
        let temp_dir = TempDir::new().unwrap();
        let engine = engine(temp_dir.path());
        let logger = Logger::new(engine.clone(), LoggerOptions::default()).unwrap();

        let session = engine.sessions().current().unwrap();
        assert_eq!(
            logger.path(),
            engine.logs_root().join(&session).join("main.log")
        );
        assert!(logger.path().parent().unwrap().is_dir());
    }

    #[test]
    fn test_webview_domains_share_session() {
        let temp_dir = TempDir::new().unwrap();
        let engine = engine(temp_dir.path());

        let a = Logger::new(
            engine.clone(),
            LoggerOptions::default()
                .role(ProcessRole::Renderer)
                .webview("A"),
        )
        .unwrap();
        let b = Logger::new(
            engine.clone(),
            LoggerOptions::default()
                .role(ProcessRole::Renderer)
                .webview("B"),
        )
        .unwrap();

        assert_eq!(a.path().file_name().unwrap(), "A.log");
        assert_eq!(b.path().file_name().unwrap(), "B.log");
        assert_ne!(a.path(), b.path());
        assert_eq!(a.path().parent(), b.path().parent());
    }

    #[test]
    fn test_custom_prefix_and_unknown_role() {
        let temp_dir = TempDir::new().unwrap();
        let engine = engine(temp_dir.path());

        let logger = Logger::new(
            engine,
            LoggerOptions::default()
                .role(ProcessRole::Other("utility".into()))
                .file_name("updater"),
        )
        .unwrap();
        assert_eq!(logger.path().file_name().unwrap(), "updater-default.log");
    }

    #[test]
    fn test_disable_then_enable_logging() {
        let temp_dir = TempDir::new().unwrap();
        let logger = Logger::new(engine(temp_dir.path()), LoggerOptions::default()).unwrap();

        logger.info(&[&"before"]);
        let before = std::fs::read_to_string(logger.path()).unwrap();

        assert_eq!(logger.disable_logging().unwrap(), "Logging disabled");
        logger.info(&[&"x"]);
        assert_eq!(std::fs::read_to_string(logger.path()).unwrap(), before);

        assert_eq!(logger.enable_logging().unwrap(), "Logging enabled");
        logger.info(&[&"x"]);
        let after = std::fs::read_to_string(logger.path()).unwrap();
        let added = &after[before.len()..];
        assert_eq!(added.lines().count(), 1);
        assert!(added.contains(r#"[info] "x""#));
    }

    #[test]
    fn test_disable_applies_to_other_loggers() {
        let temp_dir = TempDir::new().unwrap();
        let engine = engine(temp_dir.path());
        let main = Logger::new(engine.clone(), LoggerOptions::default()).unwrap();
        let renderer = Logger::new(
            engine,
            LoggerOptions::default().role(ProcessRole::Renderer),
        )
        .unwrap();

        main.disable_logging().unwrap();
        renderer.warn(&[&"muted"]);
        assert!(!renderer.path().exists());
    }

    #[test]
    fn test_error_reported_for_regular_logger() {
        let temp_dir = TempDir::new().unwrap();
        let reporter = Arc::new(RecordingReporter::default());
        let engine = engine_with(temp_dir.path(), ProcessRole::Main, reporter.clone());
        let logger = Logger::new(engine, LoggerOptions::default()).unwrap();

        logger.error(&[&"boom"]);

        assert_eq!(reporter.count(), 1);
        assert!(reporter.reports.lock().unwrap()[0].contains("boom"));
    }

    #[test]
    fn test_error_not_reported_for_webview_logger() {
        let temp_dir = TempDir::new().unwrap();
        let reporter = Arc::new(RecordingReporter::default());
        let engine = engine_with(temp_dir.path(), ProcessRole::Renderer, reporter.clone());
        let logger = Logger::new(engine, LoggerOptions::default().webview("settings")).unwrap();

        logger.error(&[&"boom"]);

        assert_eq!(reporter.count(), 0);
        assert!(std::fs::read_to_string(logger.path())
            .unwrap()
            .contains("boom"));
    }

    #[test]
    fn test_new_fails_when_root_cannot_be_created() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("app-logs");
        std::fs::write(&blocker, b"file in the way").unwrap();

        let result = Logger::new(engine(temp_dir.path()), LoggerOptions::default());
        assert!(matches!(result, Err(LogError::CreateDir { .. })));
    }

    #[tokio::test]
    async fn test_prune_old_logs_with_cutoff() {
        let temp_dir = TempDir::new().unwrap();
        let engine = engine(temp_dir.path());
        let logger = Logger::new(engine.clone(), LoggerOptions::default()).unwrap();
        logger.info(&[&"current run"]);
        let old_session = logger.path().parent().unwrap().to_path_buf();

        tokio::time::sleep(Duration::from_millis(50)).await;
        let cutoff = Utc::now();
        tokio::time::sleep(Duration::from_millis(50)).await;
        let newer = engine.logs_root().join("newer-session");
        std::fs::create_dir_all(&newer).unwrap();

        let report = logger.prune_old_logs(Some(cutoff)).await.unwrap();

        assert_eq!(report.removed.len(), 1);
        assert!(!old_session.exists());
        assert!(newer.exists());
        assert_eq!(report.to_string(), "Removed 1 expired log session(s)");
    }

    #[tokio::test]
    async fn test_prune_old_logs_default_keeps_recent() {
        let temp_dir = TempDir::new().unwrap();
        let logger = Logger::new(engine(temp_dir.path()), LoggerOptions::default()).unwrap();
        logger.info(&[&"recent"]);

        let report = logger.prune_old_logs(None).await.unwrap();

        assert!(report.removed.is_empty());
        assert!(logger.path().exists());
    }

    #[tokio::test]
    async fn test_prune_old_logs_default_removes_expired() {
        let temp_dir = TempDir::new().unwrap();
        let engine = Arc::new(
            LogEngine::new(
                temp_dir.path().join("app-logs"),
                ProcessRole::Main,
                Arc::new(MemoryStore::new()),
                Arc::new(RecordingReporter::default()),
            )
            .with_retention(Duration::from_millis(500)),
        );
        let logger = Logger::new(engine.clone(), LoggerOptions::default()).unwrap();
        engine.wait_for_prune().await;

        let expired = engine.logs_root().join("2026-01-21_14-30-45");
        std::fs::create_dir_all(&expired).unwrap();
        tokio::time::sleep(Duration::from_millis(1000)).await;

        let report = logger.prune_old_logs(None).await.unwrap();

        assert!(report
            .removed
            .contains(&"2026-01-21_14-30-45".to_string()));
        assert!(!expired.exists());
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn test_startup_prune_can_be_awaited() {
        let temp_dir = TempDir::new().unwrap();
        let engine = Arc::new(
            LogEngine::new(
                temp_dir.path().join("app-logs"),
                ProcessRole::Main,
                Arc::new(MemoryStore::new()),
                Arc::new(RecordingReporter::default()),
            )
            .with_retention(Duration::from_millis(500)),
        );
        let expired = engine.logs_root().join("2026-01-21_14-30-45");
        std::fs::create_dir_all(&expired).unwrap();
        tokio::time::sleep(Duration::from_millis(1000)).await;

        let logger = Logger::new(engine.clone(), LoggerOptions::default()).unwrap();
        engine.wait_for_prune().await;

        assert!(!expired.exists());
        assert!(logger.path().parent().unwrap().is_dir());
    }

    #[test]
    fn test_join_session_reuses_running_session() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::new());
        let root = temp_dir.path().join("app-logs");
        let engine_for = |store: Arc<MemoryStore>| {
            Arc::new(LogEngine::new(
                root.clone(),
                ProcessRole::Main,
                store,
                Arc::new(RecordingReporter::default()),
            ))
        };

        let running = Logger::new(engine_for(store.clone()), LoggerOptions::default()).unwrap();
        let session = store.get(CURRENT_SESSION_KEY).unwrap();

        // A second coordinator context, as in a separate helper process
        let helper = Logger::new(
            engine_for(store.clone()),
            LoggerOptions::default().join_session(),
        )
        .unwrap();

        assert_eq!(helper.path(), running.path());
        assert_eq!(store.get(CURRENT_SESSION_KEY), Some(session));
    }

    #[test]
    fn test_join_session_creates_session_when_none_exists() {
        let temp_dir = TempDir::new().unwrap();
        let engine = engine(temp_dir.path());

        let logger = Logger::new(engine.clone(), LoggerOptions::default().join_session()).unwrap();

        let session = engine.sessions().current().unwrap();
        assert_eq!(
            logger.path(),
            engine.logs_root().join(&session).join("main.log")
        );
    }

    #[tokio::test]
    async fn test_get_and_clear_log_archive() {
        let temp_dir = TempDir::new().unwrap();
        let engine = engine(temp_dir.path());
        let main = Logger::new(engine.clone(), LoggerOptions::default()).unwrap();
        let webview = Logger::new(
            engine.clone(),
            LoggerOptions::default()
                .role(ProcessRole::Renderer)
                .webview("A"),
        )
        .unwrap();
        main.info(&[&"main line"]);
        webview.info(&[&"webview line"]);

        let report = main.get_log_archive().await.unwrap();
        let session = engine.sessions().current().unwrap();

        assert_eq!(report.path.parent().unwrap(), engine.logs_root());
        assert_eq!(
            report.archived,
            vec![format!("{}/A.log", session), format!("{}/main.log", session)]
        );

        main.clear_log_archive(&report.path).await.unwrap();
        assert!(!report.path.exists());
    }
}
