//! In-process run store
//!
//! Keeps everything in memory behind a tokio mutex. Used for dry runs,
//! embedding and tests.

use super::traits::RunStore;
use crate::core::state::run_record::RunRecord;
use crate::domain::errors::StoreError;
use crate::domain::ids::ArtifactName;
use crate::domain::notification::NotificationBatch;
use async_trait::async_trait;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

#[derive(Default)]
struct Inner {
    records: Vec<RunRecord>,
    batches: BTreeMap<String, NotificationBatch>,
}

/// Run store held in memory, lost on drop
#[derive(Default)]
pub struct MemoryRunStore {
    inner: Mutex<Inner>,
}

impl MemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored batches
    pub async fn batch_count(&self) -> usize {
        self.inner.lock().await.batches.len()
    }

    /// Number of stored run records
    pub async fn record_count(&self) -> usize {
        self.inner.lock().await.records.len()
    }
}

fn sorted_latest_first(records: &[RunRecord]) -> Vec<RunRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by_key(|r| (Reverse(r.to_date), Reverse(r.date_imported)));
    sorted
}

#[async_trait]
impl RunStore for MemoryRunStore {
    async fn find_latest_run_record(&self) -> Result<Option<RunRecord>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(sorted_latest_first(&inner.records).into_iter().next())
    }

    async fn save_run_record(&self, record: &RunRecord) -> Result<(), StoreError> {
        self.inner.lock().await.records.push(record.clone());
        Ok(())
    }

    async fn save_batch(&self, batch: &NotificationBatch) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let key = batch.artifact.as_str();
        if inner.batches.contains_key(key) {
            return Err(StoreError::DuplicateArtifact(key.to_string()));
        }
        inner.batches.insert(key.to_string(), batch.clone());
        Ok(())
    }

    async fn delete_batch_by_artifact_name(
        &self,
        name: &ArtifactName,
    ) -> Result<bool, StoreError> {
        Ok(self.inner.lock().await.batches.remove(name.as_str()).is_some())
    }

    async fn find_batch(
        &self,
        name: &ArtifactName,
    ) -> Result<Option<NotificationBatch>, StoreError> {
        Ok(self.inner.lock().await.batches.get(name.as_str()).cloned())
    }

    async fn list_run_records(&self, limit: usize) -> Result<Vec<RunRecord>, StoreError> {
        let inner = self.inner.lock().await;
        let mut records = sorted_latest_first(&inner.records);
        records.truncate(limit);
        Ok(records)
    }
}
