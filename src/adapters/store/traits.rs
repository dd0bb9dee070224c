//! Run store abstraction
//!
//! The run store keeps run records (the watermark history) and the fetched
//! notification batches, keyed by artifact name.

use crate::core::state::run_record::RunRecord;
use crate::domain::errors::{SideEffect, StoreError, SyncError, SyncStage};
use crate::domain::ids::ArtifactName;
use crate::domain::notification::NotificationBatch;
use async_trait::async_trait;

/// Everything one run persists
#[derive(Debug, Clone)]
pub struct CommitPlan {
    /// Artifact of a same-day run whose batch is replaced
    pub supersede: Option<ArtifactName>,
    pub batch: NotificationBatch,
    pub record: RunRecord,
}

/// Storage for run records and notification batches
#[async_trait]
pub trait RunStore: Send + Sync {
    /// Most recent run record, ordered by `to_date` then `date_imported`,
    /// both descending
    async fn find_latest_run_record(&self) -> Result<Option<RunRecord>, StoreError>;

    async fn save_run_record(&self, record: &RunRecord) -> Result<(), StoreError>;

    /// Stores a batch
    ///
    /// # Errors
    ///
    /// [`StoreError::DuplicateArtifact`] if a batch with the same artifact
    /// name already exists.
    async fn save_batch(&self, batch: &NotificationBatch) -> Result<(), StoreError>;

    /// Deletes the batch stored under `name`
    ///
    /// Returns whether a batch was removed. Deleting a missing batch is not
    /// an error.
    async fn delete_batch_by_artifact_name(&self, name: &ArtifactName)
        -> Result<bool, StoreError>;

    async fn find_batch(&self, name: &ArtifactName)
        -> Result<Option<NotificationBatch>, StoreError>;

    /// Most recent run records first
    async fn list_run_records(&self, limit: usize) -> Result<Vec<RunRecord>, StoreError>;

    /// Persists one run: delete the superseded batch, save the new batch,
    /// then save the run record
    ///
    /// Each step is awaited before the next. On failure the error carries
    /// the steps that already completed. Stores that support transactions
    /// override this to make the sequence atomic.
    async fn commit_run(&self, plan: &CommitPlan) -> Result<Vec<SideEffect>, SyncError> {
        let mut completed = Vec::new();

        if let Some(prior) = &plan.supersede {
            let removed = self
                .delete_batch_by_artifact_name(prior)
                .await
                .map_err(|e| SyncError::new(SyncStage::Reconcile, e))?;
            if removed {
                completed.push(SideEffect::PriorBatchRemoved(prior.to_string()));
            }
        }

        if let Err(e) = self.save_batch(&plan.batch).await {
            return Err(SyncError::new(SyncStage::PersistBatch, e).with_completed(completed));
        }
        completed.push(SideEffect::BatchSaved(plan.batch.artifact.to_string()));

        if let Err(e) = self.save_run_record(&plan.record).await {
            return Err(SyncError::new(SyncStage::PersistBatch, e).with_completed(completed));
        }
        completed.push(SideEffect::RunRecordSaved(plan.record.artifact_name.to_string()));

        Ok(completed)
    }
}
