//! Log archive bundles
//!
//! Packs the log files of every recent session into a single zstd-compressed
//! tarball at `{logs_root}/logs-{epoch_millis}.tar.zst`. Entries keep their
//! `{session}/{file}` relative path.

use std::fs::File;
use std::io::{self, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};

use chrono::Utc;
use tokio::fs;

use super::retention::{classify, expiry_cutoff};
use crate::error::{LogError, Result};

/// File name suffix of archive bundles
pub const ARCHIVE_SUFFIX: &str = ".tar.zst";

const ZSTD_LEVEL: i32 = 3;

/// Build the path of a new archive bundle
pub fn archive_path(logs_root: &Path) -> PathBuf {
    logs_root.join(format!(
        "logs-{}{}",
        Utc::now().timestamp_millis(),
        ARCHIVE_SUFFIX
    ))
}

/// Check if a path names an archive bundle
pub fn is_archive_path(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.ends_with(ARCHIVE_SUFFIX))
        .unwrap_or(false)
}

/// Outcome of an archive pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveReport {
    /// Path of the written bundle
    pub path: PathBuf,
    /// Entry names (`session/file`) stored in the bundle
    pub archived: Vec<String>,
    /// Entries left out, with the reason
    pub skipped: Vec<(String, String)>,
}

impl ArchiveReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// A log file selected for the bundle
#[derive(Debug, Clone)]
struct PendingEntry {
    name: String,
    source: PathBuf,
}

/// Bundle the log files of every session created inside `window`
///
/// Sessions older than the window are left out entirely. Files that cannot be
/// read (including ones removed by a concurrent prune) are skipped and listed
/// in the report. Failing to write the bundle itself is an error, and the
/// partial bundle is removed.
pub async fn build_archive(logs_root: &Path, window: Duration) -> Result<ArchiveReport> {
    let cutoff = expiry_cutoff(window);
    let mut skipped = Vec::new();
    let mut pending = Vec::new();

    for session in classify(logs_root).await? {
        if !session.is_recent(cutoff) {
            continue;
        }

        let mut files = match fs::read_dir(&session.path).await {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!("Skipping log session {}: {}", session.name, e);
                skipped.push((session.name.clone(), e.to_string()));
                continue;
            }
        };

        loop {
            let entry = match files.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("Failed to list log session {}: {}", session.name, e);
                    skipped.push((session.name.clone(), e.to_string()));
                    break;
                }
            };

            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().into_owned();
            pending.push(PendingEntry {
                name: format!("{}/{}", session.name, file_name),
                source: entry.path(),
            });
        }
    }

    pending.sort_by(|a, b| a.name.cmp(&b.name));

    let output = archive_path(logs_root);
    let task_output = output.clone();
    let written =
        tokio::task::spawn_blocking(move || write_bundle(&task_output, pending)).await?;

    let (archived, unreadable) = match written {
        Ok(result) => result,
        Err(source) => {
            let _ = fs::remove_file(&output).await;
            return Err(LogError::Archive {
                path: output,
                source,
            });
        }
    };
    skipped.extend(unreadable);

    tracing::info!(
        "Wrote log archive {} ({} files, {} skipped)",
        output.display(),
        archived.len(),
        skipped.len()
    );

    Ok(ArchiveReport {
        path: output,
        archived,
        skipped,
    })
}

type BundleResult = (Vec<String>, Vec<(String, String)>);

/// Stream every readable entry into a compressed tarball at `output`
fn write_bundle(output: &Path, entries: Vec<PendingEntry>) -> io::Result<BundleResult> {
    let file = File::create(output)?;
    let encoder = zstd::stream::write::Encoder::new(file, ZSTD_LEVEL)?;
    let mut builder = tar::Builder::new(encoder);

    let mut archived = Vec::new();
    let mut skipped = Vec::new();

    for entry in entries {
        let (source, metadata) = match open_entry(&entry.source) {
            Ok(opened) => opened,
            Err(e) => {
                if e.kind() == ErrorKind::NotFound {
                    tracing::debug!("Log file {} vanished before archiving", entry.name);
                } else {
                    tracing::warn!("Skipping unreadable log file {}: {}", entry.name, e);
                }
                skipped.push((entry.name, e.to_string()));
                continue;
            }
        };

        // Log files only grow; capping the reader at the stat'ed size keeps the
        // header and data in agreement while another process appends.
        let size = metadata.len();
        let mtime = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let mut header = tar::Header::new_gnu();
        header.set_size(size);
        header.set_mode(0o644);
        header.set_mtime(mtime);
        header.set_cksum();
        builder.append_data(&mut header, &entry.name, source.take(size))?;
        archived.push(entry.name);
    }

    let encoder = builder.into_inner()?;
    let mut file = encoder.finish()?;
    file.flush()?;

    Ok((archived, skipped))
}

fn open_entry(path: &Path) -> io::Result<(File, std::fs::Metadata)> {
    let file = File::open(path)?;
    let metadata = file.metadata()?;
    Ok((file, metadata))
}

/// Delete an archive bundle
///
/// Only paths carrying the bundle suffix are accepted.
pub async fn clear_archive(path: &Path) -> Result<()> {
    if !is_archive_path(path) {
        return Err(LogError::NotAnArchive(path.to_path_buf()));
    }
    fs::remove_file(path).await?;
    tracing::info!("Removed log archive {}", path.display());
    Ok(())
}
