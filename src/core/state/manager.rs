//! State manager for run records and stored batches

use crate::adapters::store::traits::{CommitPlan, RunStore};
use crate::core::state::run_record::RunRecord;
use crate::domain::errors::{SideEffect, StoreError, SyncError};
use crate::domain::ids::ArtifactName;
use crate::domain::notification::NotificationBatch;
use std::sync::Arc;

/// Front for the run store used by the engine and the CLI
#[derive(Clone)]
pub struct StateManager {
    store: Arc<dyn RunStore>,
}

impl StateManager {
    pub fn new(store: Arc<dyn RunStore>) -> Self {
        Self { store }
    }

    /// The watermark: most recent run by coverage end date
    pub async fn latest_run(&self) -> Result<Option<RunRecord>, StoreError> {
        self.store.find_latest_run_record().await
    }

    pub async fn recent_runs(&self, limit: usize) -> Result<Vec<RunRecord>, StoreError> {
        self.store.list_run_records(limit).await
    }

    pub async fn batch(
        &self,
        artifact: &ArtifactName,
    ) -> Result<Option<NotificationBatch>, StoreError> {
        self.store.find_batch(artifact).await
    }

    /// Persists one run's results
    pub async fn commit(&self, plan: &CommitPlan) -> Result<Vec<SideEffect>, SyncError> {
        tracing::info!(
            artifact = %plan.record.artifact_name,
            from_date = %plan.record.from_date,
            to_date = %plan.record.to_date,
            item_count = plan.record.item_count,
            supersedes = plan.supersede.as_ref().map(|a| a.as_str()),
            "Committing run"
        );

        self.store.commit_run(plan).await
    }
}
