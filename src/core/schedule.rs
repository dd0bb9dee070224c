//! Run exclusivity and periodic scheduling

use crate::core::sync::SyncEngine;
use crate::domain::errors::SyncFailure;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// Exclusive run lock backed by a lock file
///
/// The file is created with create-new semantics and holds the owner's pid.
/// It is removed when the lock is dropped. A lock left behind by a crashed
/// process must be removed by hand.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    /// Takes the lock
    ///
    /// # Errors
    ///
    /// - [`SyncFailure::RunInProgress`] if the lock file already exists
    /// - [`SyncFailure::Lock`] if it cannot be created
    pub fn acquire(path: &Path) -> Result<Self, SyncFailure> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                SyncFailure::Lock(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(mut file) => {
                writeln!(file, "{}", std::process::id())
                    .map_err(|e| SyncFailure::Lock(format!("{}: {}", path.display(), e)))?;
                tracing::debug!(lock_file = %path.display(), "Run lock acquired");
                Ok(Self {
                    path: path.to_path_buf(),
                })
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let holder = fs::read_to_string(path).unwrap_or_default();
                Err(SyncFailure::RunInProgress(format!(
                    "{} is held by pid {}",
                    path.display(),
                    holder.trim()
                )))
            }
            Err(e) => Err(SyncFailure::Lock(format!("{}: {}", path.display(), e))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(lock_file = %self.path.display(), error = %e, "Failed to remove run lock");
        }
    }
}

/// Counts of a scheduler's runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Runs the engine on a fixed interval until shutdown
///
/// Runs never overlap: the next tick is only awaited once the current run has
/// finished, and ticks missed during a long run are skipped. A shutdown
/// signal received mid-run takes effect after that run completes.
pub struct SyncScheduler {
    engine: Arc<SyncEngine>,
    interval: Duration,
}

impl SyncScheduler {
    pub fn new(engine: Arc<SyncEngine>, interval: Duration) -> Self {
        Self { engine, interval }
    }

    /// Runs until `shutdown` turns true or its sender is dropped
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> ScheduleSummary {
        let mut summary = ScheduleSummary::default();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "Scheduler started"
        );

        while !*shutdown.borrow() {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.engine.run().await {
                        Ok(outcome) => {
                            summary.succeeded += 1;
                            tracing::info!(artifact = %outcome.artifact, "Scheduled run succeeded");
                        }
                        Err(e) => {
                            summary.failed += 1;
                            crate::log_error_with_context!(e, "Scheduled run failed");
                        }
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        tracing::info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Scheduler stopped"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_is_exclusive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locks").join("paye-sync.lock");

        let lock = RunLock::acquire(&path).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim(), std::process::id().to_string());

        match RunLock::acquire(&path) {
            Err(SyncFailure::RunInProgress(msg)) => {
                assert!(msg.contains(&std::process::id().to_string()))
            }
            other => panic!("expected RunInProgress, got {other:?}"),
        }

        drop(lock);
        assert!(!path.exists());
        assert!(RunLock::acquire(&path).is_ok());
    }
}
