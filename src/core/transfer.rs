//! Transfer pipeline: stage, deliver and clean up rendered artifacts

use crate::adapters::transfer::{TransferConnector, TransferSession};
use crate::config::{SyncConfig, TransferConfig};
use crate::core::render::write_artifact;
use crate::domain::errors::{RenderError, TransferError};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Moves rendered artifacts from the local staging directory to the remote
/// payroll directory
pub struct TransferPipeline {
    connector: Arc<dyn TransferConnector>,
    staging_dir: PathBuf,
    remote_dir: String,
    timeout: Duration,
}

impl TransferPipeline {
    pub fn new(
        connector: Arc<dyn TransferConnector>,
        staging_dir: impl Into<PathBuf>,
        remote_dir: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            connector,
            staging_dir: staging_dir.into(),
            remote_dir: remote_dir.into(),
            timeout,
        }
    }

    pub fn from_config(
        connector: Arc<dyn TransferConnector>,
        sync: &SyncConfig,
        transfer: &TransferConfig,
    ) -> Self {
        Self::new(
            connector,
            sync.staging_dir.clone(),
            transfer.remote_directory.clone(),
            Duration::from_secs(transfer.timeout_seconds),
        )
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Writes a rendered artifact to the staging directory
    ///
    /// Returns the exact path written; that path is what [`cleanup`](Self::cleanup)
    /// later removes.
    pub async fn stage(&self, file_name: &str, contents: &str) -> Result<PathBuf, RenderError> {
        write_artifact(&self.staging_dir, file_name, contents).await
    }

    /// Uploads a staged file under `file_name` in the remote directory
    ///
    /// Connect, upload and close are each bounded by the configured timeout.
    /// Once connected, the session is closed whatever the upload outcome.
    /// Returns the remote path.
    pub async fn deliver(&self, staged: &Path, file_name: &str) -> Result<String, TransferError> {
        let contents = tokio::fs::read(staged).await.map_err(|e| {
            TransferError::UploadFailure(format!("Failed to read {}: {}", staged.display(), e))
        })?;
        let remote_path = remote_path(&self.remote_dir, file_name);

        let mut session = bounded(self.timeout, "connect", self.connector.connect()).await?;

        let uploaded = bounded(
            self.timeout,
            "upload",
            session.put(contents, &remote_path),
        )
        .await;
        let closed = close_session(session.as_mut(), self.timeout).await;

        uploaded?;
        if let Err(e) = closed {
            tracing::warn!(remote_path = %remote_path, error = %e, "Transfer session did not close cleanly");
        }

        tracing::info!(remote_path = %remote_path, "Artifact delivered");
        Ok(remote_path)
    }

    /// Removes a staged file
    pub async fn cleanup(&self, staged: &Path) -> std::io::Result<()> {
        tokio::fs::remove_file(staged).await
    }
}

async fn close_session(
    session: &mut dyn TransferSession,
    timeout: Duration,
) -> Result<(), TransferError> {
    bounded(timeout, "close", session.close()).await
}

async fn bounded<T>(
    timeout: Duration,
    step: &str,
    fut: impl Future<Output = Result<T, TransferError>>,
) -> Result<T, TransferError> {
    tokio::time::timeout(timeout, fut)
        .await
        .unwrap_or_else(|_| {
            Err(TransferError::Timeout(format!(
                "{} exceeded {:?}",
                step, timeout
            )))
        })
}

fn remote_path(remote_dir: &str, file_name: &str) -> String {
    match remote_dir {
        "" => file_name.to_string(),
        dir if dir.ends_with('/') => format!("{}{}", dir, file_name),
        dir => format!("{}/{}", dir, file_name),
    }
}
