//! Periodic sweep of stale job directories.
//!
//! Jobs remove their own scratch directory; the sweep only catches what a
//! crashed or killed process left behind.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use tokio::fs;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::compile::JOB_DIR_PREFIX;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub removed: usize,
}

/// Removes `job-*` directories under `root` last modified before `now - max_age`.
///
/// A missing root is an empty sweep. Entries that vanish mid-sweep are skipped.
pub async fn sweep_scratch_root(
    root: &Path,
    max_age: Duration,
    now: DateTime<Utc>,
) -> anyhow::Result<SweepReport> {
    let max_age = chrono::Duration::from_std(max_age).context("sweep max age out of range")?;
    let cutoff = now - max_age;
    let mut report = SweepReport::default();

    let mut entries = match fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(report),
        Err(e) => {
            return Err(e).with_context(|| format!("read scratch root {}", root.display()))
        }
    };

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        if !name.to_string_lossy().starts_with(JOB_DIR_PREFIX) {
            continue;
        }

        let metadata = match entry.metadata().await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "cannot stat scratch entry");
                continue;
            }
        };
        if !metadata.is_dir() {
            continue;
        }
        report.scanned += 1;

        let modified: DateTime<Utc> = metadata.modified()?.into();
        if modified >= cutoff {
            continue;
        }

        match fs::remove_dir_all(entry.path()).await {
            Ok(()) => {
                report.removed += 1;
                debug!(path = %entry.path().display(), %modified, "removed stale job directory");
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "failed to remove stale job directory")
            }
        }
    }

    Ok(report)
}

/// Spawn a background worker that sweeps the scratch root every `interval`.
/// The first sweep runs immediately.
pub fn spawn_sweep_worker(
    root: PathBuf,
    interval: Duration,
    max_age: Duration,
    shutdown_token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            root = %root.display(),
            interval_secs = interval.as_secs(),
            max_age_secs = max_age.as_secs(),
            "Scratch sweep worker started"
        );

        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match sweep_scratch_root(&root, max_age, Utc::now()).await {
                        Ok(report) if report.removed > 0 => {
                            info!(scanned = report.scanned, removed = report.removed, "Scratch sweep finished");
                        }
                        Ok(report) => debug!(scanned = report.scanned, "Scratch sweep found nothing stale"),
                        Err(e) => error!(error = %e, "Scratch sweep failed"),
                    }
                }
                _ = shutdown_token.cancelled() => {
                    info!("Scratch sweep worker shutting down");
                    break;
                }
            }
        }
    })
}
