//! Synchronization run orchestration
//!
//! One run walks the stages of [`SyncStage`] strictly in order, awaiting each
//! before the next:
//!
//! `ComputeWindow -> FetchRemote -> Reconcile -> PersistBatch -> Render ->
//! Deliver -> Cleanup -> Done`
//!
//! Failures up to and including `FetchRemote` leave no trace and the run can
//! simply be repeated. From `Reconcile` on, a failure reports the side
//! effects that already happened.

use super::window::{compute_window, CoverageWindow};
use crate::adapters::revenue::PayeClient;
use crate::adapters::store::traits::CommitPlan;
use crate::config::SyncConfig;
use crate::core::render::render_batch;
use crate::core::schedule::RunLock;
use crate::core::state::{RunRecordBuilder, StateManager};
use crate::core::transfer::TransferPipeline;
use crate::domain::errors::{SideEffect, SyncError, SyncFailure, SyncStage, TransportError};
use crate::domain::ids::ArtifactName;
use crate::domain::notification::{NotificationBatch, RpnResponse};
use chrono::{Datelike, NaiveDate, Utc};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Run settings taken from the `[sync]` section
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub artifact_prefix: String,
    pub artifact_extension: String,
    pub fetch_timeout: Duration,
    /// `None` disables the run lock
    pub lock_file: Option<PathBuf>,
}

impl SyncSettings {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            artifact_prefix: config.artifact_prefix.clone(),
            artifact_extension: config.artifact_extension.clone(),
            fetch_timeout: Duration::from_secs(config.fetch_timeout_seconds),
            lock_file: Some(config.lock_file.clone()),
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self::from_config(&SyncConfig::default())
    }
}

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub run_id: Uuid,
    pub artifact: ArtifactName,
    pub file_name: String,
    pub window: CoverageWindow,
    pub item_count: u32,
    /// Artifact replaced by this same-day re-run
    pub superseded: Option<ArtifactName>,
    pub remote_path: String,
    /// Set when the staged file could not be removed after delivery
    pub cleanup_error: Option<String>,
}

/// Result of redelivering a stored batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redelivery {
    pub artifact: ArtifactName,
    pub file_name: String,
    pub remote_path: String,
    pub cleanup_error: Option<String>,
}

/// Drives synchronization runs for one employer certificate
pub struct SyncEngine {
    client: PayeClient,
    state: StateManager,
    transfer: TransferPipeline,
    settings: SyncSettings,
}

struct Delivered {
    file_name: String,
    remote_path: String,
    cleanup_error: Option<String>,
}

impl SyncEngine {
    pub fn new(
        client: PayeClient,
        state: StateManager,
        transfer: TransferPipeline,
        settings: SyncSettings,
    ) -> Self {
        Self {
            client,
            state,
            transfer,
            settings,
        }
    }

    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Runs one synchronization for today's date (UTC)
    ///
    /// Resolves with the artifact produced, or with a [`SyncError`] naming
    /// the stage that failed and the side effects already completed.
    pub async fn run(&self) -> Result<SyncOutcome, SyncError> {
        self.run_on(Utc::now().date_naive()).await
    }

    /// Runs one synchronization as if today were `today`
    pub async fn run_on(&self, today: NaiveDate) -> Result<SyncOutcome, SyncError> {
        let started = Instant::now();
        let run_id = Uuid::new_v4();
        let _lock = self.lock(SyncStage::ComputeWindow)?;

        // ComputeWindow
        let prior = self
            .state
            .latest_run()
            .await
            .map_err(|e| SyncError::new(SyncStage::ComputeWindow, e))?;
        let plan = compute_window(prior.as_ref(), today)
            .map_err(|e| SyncError::new(SyncStage::ComputeWindow, e))?;
        let window = plan.window;
        let artifact = ArtifactName::for_date(&self.settings.artifact_prefix, window.to)
            .map_err(|e| SyncError::new(SyncStage::ComputeWindow, SyncFailure::InvalidArtifact(e)))?;

        crate::log_run_start!(run_id, window);
        if let Some(prior) = &plan.supersedes {
            tracing::info!(run_id = %run_id, superseded = %prior, "Same-day re-run supersedes prior artifact");
        }

        // FetchRemote
        let response = self.fetch(window).await?;
        tracing::info!(
            run_id = %run_id,
            stage = SyncStage::FetchRemote.as_str(),
            item_count = response.total_rpn_count,
            rpns = response.rpns.len(),
            "Fetched notifications"
        );

        // Reconcile, PersistBatch
        let batch = NotificationBatch::new(artifact.clone(), response);
        let record = RunRecordBuilder::new(artifact.clone(), window)
            .id(run_id)
            .year(window.to.year())
            .item_count(batch.item_count)
            .superseded(plan.supersedes.clone())
            .build();
        let commit = CommitPlan {
            supersede: plan.supersedes.clone(),
            batch,
            record,
        };
        let mut completed = self.state.commit(&commit).await?;

        // Render, Deliver, Cleanup
        let delivered = self
            .deliver(&artifact, &commit.batch.response, &mut completed)
            .await?;

        crate::log_run_complete!(run_id, artifact, commit.batch.item_count, started.elapsed());

        Ok(SyncOutcome {
            run_id,
            artifact,
            file_name: delivered.file_name,
            window,
            item_count: commit.batch.item_count,
            superseded: plan.supersedes,
            remote_path: delivered.remote_path,
            cleanup_error: delivered.cleanup_error,
        })
    }

    /// Renders a stored batch and delivers it again
    ///
    /// For runs that persisted their batch but failed to deliver it.
    pub async fn redeliver(&self, artifact: &ArtifactName) -> Result<Redelivery, SyncError> {
        let _lock = self.lock(SyncStage::Render)?;

        let batch = self
            .state
            .batch(artifact)
            .await
            .map_err(|e| SyncError::new(SyncStage::Render, e))?
            .ok_or_else(|| {
                SyncError::new(
                    SyncStage::Render,
                    SyncFailure::UnknownArtifact(artifact.to_string()),
                )
            })?;

        tracing::info!(artifact = %artifact, item_count = batch.item_count, "Redelivering stored batch");

        let mut completed = Vec::new();
        let delivered = self
            .deliver(artifact, &batch.response, &mut completed)
            .await?;

        Ok(Redelivery {
            artifact: artifact.clone(),
            file_name: delivered.file_name,
            remote_path: delivered.remote_path,
            cleanup_error: delivered.cleanup_error,
        })
    }

    fn lock(&self, stage: SyncStage) -> Result<Option<RunLock>, SyncError> {
        self.settings
            .lock_file
            .as_deref()
            .map(RunLock::acquire)
            .transpose()
            .map_err(|e| SyncError::new(stage, e))
    }

    async fn fetch(&self, window: CoverageWindow) -> Result<RpnResponse, SyncError> {
        let timeout = self.settings.fetch_timeout;
        let lookup = self
            .client
            .lookup_rpns_by_employer(window.to.year(), Some(window.from), &[]);

        match tokio::time::timeout(timeout, lookup).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(SyncError::new(SyncStage::FetchRemote, e)),
            Err(_) => Err(SyncError::new(
                SyncStage::FetchRemote,
                TransportError::Timeout(format!("fetch exceeded {timeout:?}")),
            )),
        }
    }

    async fn deliver(
        &self,
        artifact: &ArtifactName,
        response: &RpnResponse,
        completed: &mut Vec<SideEffect>,
    ) -> Result<Delivered, SyncError> {
        let file_name = artifact.file_name(&self.settings.artifact_extension);

        // Render
        let xml = render_batch(response)
            .map_err(|e| SyncError::new(SyncStage::Render, e).with_completed(completed.clone()))?;
        let staged = self
            .transfer
            .stage(&file_name, &xml)
            .await
            .map_err(|e| SyncError::new(SyncStage::Render, e).with_completed(completed.clone()))?;
        completed.push(SideEffect::ArtifactStaged(staged.display().to_string()));

        // Deliver
        let remote_path = self
            .transfer
            .deliver(&staged, &file_name)
            .await
            .map_err(|e| SyncError::new(SyncStage::Deliver, e).with_completed(completed.clone()))?;
        completed.push(SideEffect::ArtifactDelivered(remote_path.clone()));

        // Cleanup
        let cleanup_error = match self.transfer.cleanup(&staged).await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(
                    artifact = %artifact,
                    staged = %staged.display(),
                    error = %e,
                    "Failed to remove staged artifact"
                );
                Some(e.to_string())
            }
        };

        Ok(Delivered {
            file_name,
            remote_path,
            cleanup_error,
        })
    }
}
