//! Coverage window computation
//!
//! Pure function of the latest run record and today's date. Successive
//! windows are contiguous: a new window starts where the previous one ended.

use crate::core::state::RunRecord;
use crate::domain::errors::SyncFailure;
use crate::domain::ids::ArtifactName;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive date range a run requests updated notifications for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl CoverageWindow {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// Window covering a single day
    pub fn day(date: NaiveDate) -> Self {
        Self::new(date, date)
    }
}

impl fmt::Display for CoverageWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.from, self.to)
    }
}

/// Window of the next run and the artifact it replaces, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowPlan {
    pub window: CoverageWindow,
    pub supersedes: Option<ArtifactName>,
}

/// Computes the next run's window
///
/// - no prior run: `[today, today]`
/// - prior run already covers today (starts or ends today): same-day re-run,
///   the window is `[prior.from, today]` and the prior artifact is superseded
/// - otherwise: `[prior.to, today]`
///
/// # Errors
///
/// [`SyncFailure::InvalidWindow`] when the prior run ends after `today`.
pub fn compute_window(
    prior: Option<&RunRecord>,
    today: NaiveDate,
) -> Result<WindowPlan, SyncFailure> {
    let Some(prior) = prior else {
        return Ok(WindowPlan {
            window: CoverageWindow::day(today),
            supersedes: None,
        });
    };

    if prior.to_date > today {
        return Err(SyncFailure::InvalidWindow {
            prior_to: prior.to_date,
            today,
        });
    }

    // A prior run ending today already owns today's artifact name. Starting
    // at prior.to would save a second batch under that name and fail with
    // DuplicateArtifact, so the prior run is replaced from its own start.
    if prior.from_date == today || prior.to_date == today {
        return Ok(WindowPlan {
            window: CoverageWindow::new(prior.from_date, today),
            supersedes: Some(prior.artifact_name.clone()),
        });
    }

    Ok(WindowPlan {
        window: CoverageWindow::new(prior.to_date, today),
        supersedes: None,
    })
}
