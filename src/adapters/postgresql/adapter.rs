//! PostgreSQL run store
//!
//! Implements [`RunStore`] over the `rpn_run_records` and `rpn_batches`
//! tables. `commit_run` runs the delete, the batch insert and the record
//! insert in one transaction.

use crate::adapters::postgresql::client::{map_db_error, PostgreSQLClient};
use crate::adapters::postgresql::models::{PostgreSQLBatch, PostgreSQLRunRecord};
use crate::adapters::store::traits::{CommitPlan, RunStore};
use crate::core::state::run_record::RunRecord;
use crate::domain::errors::{SideEffect, StoreError, SyncError, SyncStage};
use crate::domain::ids::ArtifactName;
use crate::domain::notification::NotificationBatch;
use async_trait::async_trait;
use std::sync::Arc;

const SELECT_RUN_RECORDS: &str = "SELECT id, year, date_imported, from_date, to_date, \
     artifact_name, item_count, superseded_artifact FROM rpn_run_records \
     ORDER BY to_date DESC, date_imported DESC LIMIT $1";

const INSERT_RUN_RECORD: &str = "INSERT INTO rpn_run_records (id, year, date_imported, \
     from_date, to_date, artifact_name, item_count, superseded_artifact) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8)";

const INSERT_BATCH: &str = "INSERT INTO rpn_batches (artifact_name, \
     employer_registration_number, tax_year, item_count, date_uploaded, document) \
     VALUES ($1, $2, $3, $4, $5, $6)";

const DELETE_BATCH: &str = "DELETE FROM rpn_batches WHERE artifact_name = $1";

const SELECT_BATCH: &str = "SELECT artifact_name, employer_registration_number, tax_year, \
     item_count, date_uploaded, document FROM rpn_batches WHERE artifact_name = $1";

/// PostgreSQL-backed [`RunStore`]
pub struct PostgresRunStore {
    client: Arc<PostgreSQLClient>,
}

impl PostgresRunStore {
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }

    async fn select_run_records(&self, limit: i64) -> Result<Vec<RunRecord>, StoreError> {
        let rows = self.client.query(SELECT_RUN_RECORDS, &[&limit]).await?;
        rows.iter()
            .map(|row| PostgreSQLRunRecord::from_row(row).to_domain())
            .collect()
    }
}

#[async_trait]
impl RunStore for PostgresRunStore {
    async fn find_latest_run_record(&self) -> Result<Option<RunRecord>, StoreError> {
        let record = self.select_run_records(1).await?.into_iter().next();

        match &record {
            Some(r) => tracing::debug!(
                artifact = %r.artifact_name,
                from_date = %r.from_date,
                to_date = %r.to_date,
                "Latest run record loaded from PostgreSQL"
            ),
            None => tracing::debug!("No run record found in PostgreSQL (first run)"),
        }

        Ok(record)
    }

    async fn save_run_record(&self, record: &RunRecord) -> Result<(), StoreError> {
        let row = PostgreSQLRunRecord::from_domain(record);
        self.client
            .execute(
                INSERT_RUN_RECORD,
                &[
                    &row.id,
                    &row.year,
                    &row.date_imported,
                    &row.from_date,
                    &row.to_date,
                    &row.artifact_name,
                    &row.item_count,
                    &row.superseded_artifact,
                ],
            )
            .await?;
        Ok(())
    }

    async fn save_batch(&self, batch: &NotificationBatch) -> Result<(), StoreError> {
        let row = PostgreSQLBatch::from_domain(batch)?;
        self.client
            .execute(
                INSERT_BATCH,
                &[
                    &row.artifact_name,
                    &row.employer_registration_number,
                    &row.tax_year,
                    &row.item_count,
                    &row.date_uploaded,
                    &row.document,
                ],
            )
            .await
            .map_err(|e| match e {
                StoreError::DuplicateArtifact(_) => {
                    StoreError::DuplicateArtifact(row.artifact_name.clone())
                }
                other => other,
            })?;
        Ok(())
    }

    async fn delete_batch_by_artifact_name(
        &self,
        name: &ArtifactName,
    ) -> Result<bool, StoreError> {
        let deleted = self.client.execute(DELETE_BATCH, &[&name.as_str()]).await?;
        Ok(deleted > 0)
    }

    async fn find_batch(
        &self,
        name: &ArtifactName,
    ) -> Result<Option<NotificationBatch>, StoreError> {
        let rows = self.client.query(SELECT_BATCH, &[&name.as_str()]).await?;
        rows.first()
            .map(|row| PostgreSQLBatch::from_row(row).to_domain())
            .transpose()
    }

    async fn list_run_records(&self, limit: usize) -> Result<Vec<RunRecord>, StoreError> {
        self.select_run_records(i64::try_from(limit).unwrap_or(i64::MAX))
            .await
    }

    async fn commit_run(&self, plan: &CommitPlan) -> Result<Vec<SideEffect>, SyncError> {
        let persist_err = |e: StoreError| SyncError::new(SyncStage::PersistBatch, e);

        let batch = PostgreSQLBatch::from_domain(&plan.batch).map_err(persist_err)?;
        let record = PostgreSQLRunRecord::from_domain(&plan.record);

        let mut client = self.client.get_connection().await.map_err(persist_err)?;
        let tx = client
            .transaction()
            .await
            .map_err(|e| persist_err(map_db_error(e, "Failed to begin transaction")))?;

        let mut completed = Vec::new();

        if let Some(prior) = &plan.supersede {
            let deleted = tx
                .execute(DELETE_BATCH, &[&prior.as_str()])
                .await
                .map_err(|e| {
                    SyncError::new(SyncStage::Reconcile, map_db_error(e, "Delete failed"))
                })?;
            if deleted > 0 {
                completed.push(SideEffect::PriorBatchRemoved(prior.to_string()));
            }
        }

        tx.execute(
            INSERT_BATCH,
            &[
                &batch.artifact_name,
                &batch.employer_registration_number,
                &batch.tax_year,
                &batch.item_count,
                &batch.date_uploaded,
                &batch.document,
            ],
        )
        .await
        .map_err(|e| match map_db_error(e, "Insert batch failed") {
            StoreError::DuplicateArtifact(_) => {
                persist_err(StoreError::DuplicateArtifact(batch.artifact_name.clone()))
            }
            other => persist_err(other),
        })?;
        completed.push(SideEffect::BatchSaved(batch.artifact_name.clone()));

        tx.execute(
            INSERT_RUN_RECORD,
            &[
                &record.id,
                &record.year,
                &record.date_imported,
                &record.from_date,
                &record.to_date,
                &record.artifact_name,
                &record.item_count,
                &record.superseded_artifact,
            ],
        )
        .await
        .map_err(|e| persist_err(map_db_error(e, "Insert run record failed")))?;
        completed.push(SideEffect::RunRecordSaved(record.artifact_name.clone()));

        // Nothing is visible until commit; a failure here leaves no side effects
        tx.commit()
            .await
            .map_err(|e| persist_err(map_db_error(e, "Commit failed")))?;

        tracing::debug!(
            artifact = %record.artifact_name,
            side_effects = completed.len(),
            "Run committed to PostgreSQL"
        );

        Ok(completed)
    }
}
