//! Domain models and types for PAYE Sync.
//!
//! The domain layer provides:
//! - **Identifiers** ([`ArtifactName`], [`Ppsn`])
//! - **Notification models** ([`RpnResponse`], [`NotificationBatch`])
//! - **Signing identities** ([`CertificateContext`])
//! - **Error types** ([`PayeError`], [`SyncError`] and the per-component errors)
//!
//! ```rust
//! use paye_sync::domain::{ArtifactName, Ppsn};
//!
//! # fn example() -> Result<(), String> {
//! let artifact: ArtifactName = "RPN_20240301".parse()?;
//! let ppsn = Ppsn::new("1234567t")?;
//! assert_eq!(ppsn.as_str(), "1234567T");
//! # let _ = artifact;
//! # Ok(())
//! # }
//! ```

pub mod certificate;
pub mod errors;
pub mod ids;
pub mod notification;
pub mod result;

pub use certificate::CertificateContext;
pub use errors::{
    ClientError, PayeError, RenderError, SideEffect, SigningError, StoreError, SyncError,
    SyncFailure, SyncStage, TransferError, TransportError,
};
pub use ids::{ArtifactName, Ppsn};
pub use notification::{
    AcknowledgementStatus, EmployeeId, EmployeeName, IncomeTaxBasis, NotificationBatch,
    PayrollSubmissionResult, Rpn, RpnResponse, TaxRate, UscRate, UscStatus, ValidationError,
};
pub use result::Result;
