//! Run record model ("file log")
//!
//! One record is written per synchronization run. The most recent record
//! (by coverage end date, then import time) is the watermark the next run
//! starts from.

use crate::core::sync::window::CoverageWindow;
use crate::domain::ids::ArtifactName;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Record of one synchronization run
///
/// # Examples
///
/// ```
/// use paye_sync::core::state::RunRecordBuilder;
/// use paye_sync::core::sync::CoverageWindow;
/// use paye_sync::domain::ArtifactName;
/// use chrono::NaiveDate;
///
/// let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// let artifact = ArtifactName::for_date("RPN", day).unwrap();
///
/// let record = RunRecordBuilder::new(artifact, CoverageWindow::day(day))
///     .item_count(12)
///     .build();
///
/// assert_eq!(record.year, 2024);
/// assert_eq!(record.item_count, 12);
/// assert!(!record.is_supersession());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Unique id of the run
    pub id: Uuid,

    /// Reporting year
    pub year: i32,

    /// When the run persisted its results
    pub date_imported: DateTime<Utc>,

    /// Coverage window start (inclusive)
    pub from_date: NaiveDate,

    /// Coverage window end (inclusive)
    pub to_date: NaiveDate,

    /// Artifact generated by the run
    pub artifact_name: ArtifactName,

    /// Number of notifications fetched
    pub item_count: u32,

    /// Artifact this run replaced, for same-day re-runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superseded: Option<ArtifactName>,
}

impl RunRecord {
    pub fn window(&self) -> CoverageWindow {
        CoverageWindow::new(self.from_date, self.to_date)
    }

    pub fn is_supersession(&self) -> bool {
        self.superseded.is_some()
    }
}

/// Builder for [`RunRecord`]
pub struct RunRecordBuilder {
    id: Option<Uuid>,
    artifact_name: ArtifactName,
    window: CoverageWindow,
    year: Option<i32>,
    date_imported: Option<DateTime<Utc>>,
    item_count: u32,
    superseded: Option<ArtifactName>,
}

impl RunRecordBuilder {
    pub fn new(artifact_name: ArtifactName, window: CoverageWindow) -> Self {
        Self {
            id: None,
            artifact_name,
            window,
            year: None,
            date_imported: None,
            item_count: 0,
            superseded: None,
        }
    }

    pub fn id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    /// Reporting year; defaults to the year of the window end
    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn date_imported(mut self, timestamp: DateTime<Utc>) -> Self {
        self.date_imported = Some(timestamp);
        self
    }

    pub fn item_count(mut self, count: u32) -> Self {
        self.item_count = count;
        self
    }

    pub fn superseded(mut self, artifact: Option<ArtifactName>) -> Self {
        self.superseded = artifact;
        self
    }

    pub fn build(self) -> RunRecord {
        RunRecord {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            year: self.year.unwrap_or_else(|| self.window.to.year()),
            date_imported: self.date_imported.unwrap_or_else(Utc::now),
            from_date: self.window.from,
            to_date: self.window.to,
            artifact_name: self.artifact_name,
            item_count: self.item_count,
            superseded: self.superseded,
        }
    }
}
