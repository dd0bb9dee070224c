//! Result type alias for PAYE Sync

use super::errors::PayeError;

/// Result type alias for application-level operations
///
/// # Examples
///
/// ```
/// use paye_sync::domain::result::Result;
/// use paye_sync::domain::errors::PayeError;
///
/// fn failing_function() -> Result<()> {
///     Err(PayeError::Validation("Invalid input".to_string()))
/// }
///
/// assert!(failing_function().is_err());
/// ```
pub type Result<T> = std::result::Result<T, PayeError>;
