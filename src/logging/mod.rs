//! Logging and observability
//!
//! Structured logging through `tracing`: a console layer, plus an optional
//! JSON file layer with daily or hourly rotation.
//!
//! # Example
//!
//! ```no_run
//! use paye_sync::logging::init_logging;
//! use paye_sync::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(artifact = "RPN_20240301", "Artifact delivered");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a synchronization run
///
/// # Example
///
/// ```no_run
/// use paye_sync::log_run_start;
/// use paye_sync::core::sync::CoverageWindow;
/// use chrono::NaiveDate;
///
/// let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// let run_id = uuid::Uuid::new_v4();
/// log_run_start!(run_id, CoverageWindow::day(today));
/// ```
#[macro_export]
macro_rules! log_run_start {
    ($run_id:expr, $window:expr) => {
        tracing::info!(
            run_id = %$run_id,
            from_date = %$window.from,
            to_date = %$window.to,
            "Starting synchronization run"
        );
    };
}

/// Log the completion of a synchronization run
///
/// # Example
///
/// ```no_run
/// use paye_sync::log_run_complete;
/// use std::time::Duration;
///
/// let run_id = uuid::Uuid::new_v4();
/// log_run_complete!(run_id, "RPN_20240301", 12, Duration::from_secs(3));
/// ```
#[macro_export]
macro_rules! log_run_complete {
    ($run_id:expr, $artifact:expr, $item_count:expr, $duration:expr) => {
        tracing::info!(
            run_id = %$run_id,
            artifact = %$artifact,
            item_count = $item_count,
            duration_ms = $duration.as_millis() as u64,
            "Synchronization run completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use paye_sync::log_error_with_context;
/// use paye_sync::domain::PayeError;
///
/// let error = PayeError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log a retry attempt of an outbound request
///
/// # Example
///
/// ```no_run
/// use paye_sync::log_retry_attempt;
///
/// log_retry_attempt!("/rpn/8000242TH/2024", 2, 3, 2000u64, "Network error: reset");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($path:expr, $attempt:expr, $max_retries:expr, $delay_ms:expr, $reason:expr) => {
        tracing::warn!(
            path = %$path,
            attempt = $attempt,
            max_retries = $max_retries,
            delay_ms = $delay_ms,
            reason = %$reason,
            "Retrying request"
        );
    };
}
