//! Sessionlog CLI
//!
//! Thin wrapper around the session log engine for scripting and support use.
//!
//! ```bash
//! # Append a line to the current session's main.log
//! sessionlog write info "application started"
//!
//! # Append to a renderer sub-log
//! sessionlog write warn "slow frame" --role renderer --webview --domain settings
//!
//! # List sessions with their age
//! sessionlog sessions
//!
//! # Bundle recent sessions, then remove the bundle once uploaded
//! sessionlog archive
//! sessionlog clear ~/.local/share/sessionlog-logs/logs-1737469845000.tar.zst
//!
//! # Remove sessions older than 3 days
//! sessionlog prune --older-than-days 3
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};

use sessionlog::config::{self, Config};
use sessionlog::logging::{self, LogEngine, LogLevel, Logger, LoggerOptions, ProcessRole};
use sessionlog::{JsonFileStore, TracingReporter};

/// Per-session log files with retention and archive export
#[derive(Parser)]
#[command(name = "sessionlog")]
#[command(version)]
#[command(about = "Per-session log files with retention and archive export")]
struct Cli {
    /// Config file (default: platform config dir/sessionlog/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Logs root, overriding the config file
    #[arg(long, global = true)]
    logs_root: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Append one record to a log file of the current session
    ///
    /// Joins the session of the running application; a new session is only
    /// started when none exists yet.
    Write {
        /// debug, log, info, warn or error
        level: LogLevel,
        /// Values to log
        #[arg(required = true)]
        message: Vec<String>,
        /// Process role (default: from config)
        #[arg(long)]
        role: Option<ProcessRole>,
        /// Write to a renderer sub-log
        #[arg(long)]
        webview: bool,
        /// Sub-log label used with --webview
        #[arg(long, default_value = logging::DEFAULT_DOMAIN)]
        domain: String,
        /// Prefix for the log file name
        #[arg(long)]
        file_name: Option<String>,
    },

    /// List sessions under the logs root
    Sessions,

    /// Bundle every session inside the retention window
    Archive,

    /// Delete expired sessions
    Prune {
        /// Cutoff in days (default: retention from config)
        #[arg(long)]
        older_than_days: Option<u64>,
    },

    /// Delete an archive bundle
    Clear {
        path: PathBuf,
    },

    /// Enable logging for every process of the application
    Enable,

    /// Disable logging for every process of the application
    Disable,

    /// Show logs root, current session and logging state
    Status,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(root) = &cli.logs_root {
        config.logs_root = Some(root.clone());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_diagnostics("sessionlog=info");

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let store = Arc::new(JsonFileStore::new(config.store_path()));
    let engine = Arc::new(
        LogEngine::new(
            config.logs_root(),
            config.role(),
            store,
            Arc::new(TracingReporter),
        )
        .with_retention(config.retention()),
    );

    match cli.command {
        Commands::Write {
            level,
            message,
            role,
            webview,
            domain,
            file_name,
        } => {
            let options = LoggerOptions {
                file_name,
                is_webview: webview,
                domain,
                role,
                join_session: true,
            };
            let logger =
                Logger::new(engine.clone(), options).context("Failed to set up logger")?;
            let values: Vec<&dyn std::fmt::Debug> =
                message.iter().map(|m| m as &dyn std::fmt::Debug).collect();
            logger.write(level, &values);
            println!("{}", logger.path().display());

            // The runtime is torn down when main returns
            engine.wait_for_prune().await;
        }
        Commands::Sessions => {
            let sessions = engine.list_sessions().await?;
            if sessions.is_empty() {
                println!("No log sessions in {}", engine.logs_root().display());
            }
            let cutoff = engine.expiry_cutoff();
            for session in sessions {
                let age = Utc::now() - session.created;
                let state = if session.is_expired(cutoff) {
                    "expired"
                } else {
                    "recent"
                };
                println!(
                    "{}  created {}  ({}h old, {})",
                    session.name,
                    session.created.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
                    age.num_hours(),
                    state
                );
            }
        }
        Commands::Archive => {
            let report = engine.build_archive().await?;
            for (name, reason) in &report.skipped {
                eprintln!("skipped {}: {}", name, reason);
            }
            println!("{}", report.path.display());
        }
        Commands::Prune { older_than_days } => {
            let cutoff = older_than_days
                .map(|days| logging::expiry_cutoff(logging::retention_days(days)));
            let report = engine.prune_older_than(cutoff).await?;
            for (name, reason) in &report.failed {
                eprintln!("failed to remove {}: {}", name, reason);
            }
            println!("{}", report);
        }
        Commands::Clear { path } => {
            engine.clear_archive(&path).await?;
            println!("Removed {}", path.display());
        }
        Commands::Enable => println!("{}", engine.enable_logging()?),
        Commands::Disable => println!("{}", engine.disable_logging()?),
        Commands::Status => {
            println!("Logs root:       {}", engine.logs_root().display());
            println!(
                "Current session: {}",
                engine
                    .sessions()
                    .current()
                    .unwrap_or_else(|| "(none)".to_string())
            );
            println!(
                "Logging:         {}",
                if engine.switch().is_enabled() {
                    "enabled"
                } else {
                    "disabled"
                }
            );
            println!("Retention:       {} days", config.retention_days);
            let config_path = cli.config.unwrap_or_else(config::config_file_path);
            println!("Config file:     {}", config_path.display());
        }
    }

    Ok(())
}
