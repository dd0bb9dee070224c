//! PostgreSQL row models
//!
//! Mirror the `rpn_run_records` and `rpn_batches` tables and convert to and
//! from the domain types.

use crate::core::state::run_record::RunRecord;
use crate::domain::errors::StoreError;
use crate::domain::ids::ArtifactName;
use crate::domain::notification::{NotificationBatch, RpnResponse};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use tokio_postgres::Row;
use uuid::Uuid;

/// Row of `rpn_run_records`
#[derive(Debug, Clone)]
pub struct PostgreSQLRunRecord {
    pub id: Uuid,
    pub year: i32,
    pub date_imported: DateTime<Utc>,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub artifact_name: String,
    pub item_count: i32,
    pub superseded_artifact: Option<String>,
}

impl PostgreSQLRunRecord {
    pub fn from_domain(record: &RunRecord) -> Self {
        Self {
            id: record.id,
            year: record.year,
            date_imported: record.date_imported,
            from_date: record.from_date,
            to_date: record.to_date,
            artifact_name: record.artifact_name.to_string(),
            item_count: i32::try_from(record.item_count).unwrap_or(i32::MAX),
            superseded_artifact: record.superseded.as_ref().map(|a| a.to_string()),
        }
    }

    pub fn from_row(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            year: row.get("year"),
            date_imported: row.get("date_imported"),
            from_date: row.get("from_date"),
            to_date: row.get("to_date"),
            artifact_name: row.get("artifact_name"),
            item_count: row.get("item_count"),
            superseded_artifact: row.get("superseded_artifact"),
        }
    }

    pub fn to_domain(&self) -> Result<RunRecord, StoreError> {
        let superseded = self
            .superseded_artifact
            .as_deref()
            .map(ArtifactName::new)
            .transpose()
            .map_err(StoreError::Serialization)?;

        Ok(RunRecord {
            id: self.id,
            year: self.year,
            date_imported: self.date_imported,
            from_date: self.from_date,
            to_date: self.to_date,
            artifact_name: ArtifactName::new(self.artifact_name.as_str())
                .map_err(StoreError::Serialization)?,
            item_count: u32::try_from(self.item_count).unwrap_or(0),
            superseded,
        })
    }
}

/// Row of `rpn_batches`; the response is kept as a JSONB document
#[derive(Debug, Clone)]
pub struct PostgreSQLBatch {
    pub artifact_name: String,
    pub employer_registration_number: String,
    pub tax_year: Option<i32>,
    pub item_count: i32,
    pub date_uploaded: DateTime<Utc>,
    pub document: Value,
}

impl PostgreSQLBatch {
    pub fn from_domain(batch: &NotificationBatch) -> Result<Self, StoreError> {
        Ok(Self {
            artifact_name: batch.artifact.to_string(),
            employer_registration_number: batch.response.employer_registration_number.clone(),
            tax_year: batch.response.tax_year,
            item_count: i32::try_from(batch.item_count).unwrap_or(i32::MAX),
            date_uploaded: batch.date_uploaded,
            document: serde_json::to_value(&batch.response)
                .map_err(|e| StoreError::Serialization(e.to_string()))?,
        })
    }

    pub fn from_row(row: &Row) -> Self {
        Self {
            artifact_name: row.get("artifact_name"),
            employer_registration_number: row.get("employer_registration_number"),
            tax_year: row.get("tax_year"),
            item_count: row.get("item_count"),
            date_uploaded: row.get("date_uploaded"),
            document: row.get("document"),
        }
    }

    pub fn to_domain(&self) -> Result<NotificationBatch, StoreError> {
        let response: RpnResponse = serde_json::from_value(self.document.clone())
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        Ok(NotificationBatch {
            artifact: ArtifactName::new(self.artifact_name.as_str())
                .map_err(StoreError::Serialization)?,
            date_uploaded: self.date_uploaded,
            item_count: u32::try_from(self.item_count).unwrap_or(0),
            response,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::RunRecordBuilder;
    use crate::core::sync::CoverageWindow;
    use crate::domain::notification::fixtures::sample_response;

    #[test]
    fn test_run_record_conversion() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let artifact = ArtifactName::for_date("RPN", day).unwrap();
        let record = RunRecordBuilder::new(artifact.clone(), CoverageWindow::day(day))
            .item_count(4)
            .superseded(Some(artifact))
            .build();

        let row = PostgreSQLRunRecord::from_domain(&record);
        assert_eq!(row.superseded_artifact.as_deref(), Some("RPN_20240302"));
        assert_eq!(row.to_domain().unwrap(), record);
    }

    #[test]
    fn test_batch_conversion() {
        let artifact = ArtifactName::new("RPN_20240301").unwrap();
        let batch = NotificationBatch::new(artifact, sample_response());

        let row = PostgreSQLBatch::from_domain(&batch).unwrap();
        assert_eq!(row.employer_registration_number, "8000242TH");
        assert_eq!(row.document["totalRPNCount"], 1);
        assert_eq!(row.to_domain().unwrap(), batch);
    }

    #[test]
    fn test_corrupt_artifact_name() {
        let mut row = PostgreSQLBatch::from_domain(&NotificationBatch::new(
            ArtifactName::new("RPN_20240301").unwrap(),
            sample_response(),
        ))
        .unwrap();
        row.artifact_name = "garbage".to_string();
        assert!(matches!(row.to_domain(), Err(StoreError::Serialization(_))));
    }
}
