//! Domain error types
//!
//! Each external concern (signing, transport, storage, rendering, file
//! transfer) has its own error enum. None of them expose third-party types;
//! the underlying cause is carried as a message.

use std::fmt;
use thiserror::Error;

/// Application-level error type
///
/// Used by configuration loading, logging setup and the CLI plumbing.
/// The synchronization engine itself reports [`SyncError`].
#[derive(Debug, Error)]
pub enum PayeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Request signing errors
    #[error(transparent)]
    Signing(#[from] SigningError),

    /// Store errors
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Signed API call errors
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Rendering errors
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Synchronization run errors
    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// Errors raised while building a request signature
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    /// A header that must be signed is not present on the request
    #[error("Missing header required for signing: {0}")]
    MissingHeader(String),

    /// The private key could not be recovered from the certificate secret
    #[error("Failed to derive signing key: {0}")]
    KeyDerivationFailure(String),

    /// The signature primitive itself failed
    #[error("Failed to compute signature: {0}")]
    Signature(String),
}

/// Errors raised by the transport adapter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Network-level failure (DNS, connect, TLS, reset)
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-success status
    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The call did not complete in time
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// The request could not be turned into a valid HTTP request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The response body could not be decoded or failed validation
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl TransportError {
    /// Whether resending the identical request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Network(_) | TransportError::Timeout(_) => true,
            TransportError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Errors from a signed API call: either signing or sending failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Errors raised by the run store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A batch with the same artifact name already exists
    #[error("Artifact already stored: {0}")]
    DuplicateArtifact(String),

    /// The store could not be reached
    #[error("Store connection failed: {0}")]
    ConnectionFailure(String),

    /// A query or statement failed
    #[error("Store query failed: {0}")]
    Query(String),

    /// A stored document could not be encoded or decoded
    #[error("Store serialization failed: {0}")]
    Serialization(String),
}

/// Errors raised while rendering or parsing the transfer file
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("Failed to render artifact: {0}")]
    Serialize(String),

    #[error("Failed to parse artifact: {0}")]
    Parse(String),

    #[error("Failed to write artifact: {0}")]
    Io(String),
}

/// Errors raised by the file-transfer session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("Failed to connect to transfer host: {0}")]
    ConnectFailure(String),

    #[error("Upload failed: {0}")]
    UploadFailure(String),

    #[error("Transfer timeout: {0}")]
    Timeout(String),
}

/// States of a synchronization run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncStage {
    ComputeWindow,
    FetchRemote,
    Reconcile,
    PersistBatch,
    Render,
    Deliver,
    Cleanup,
    Done,
}

impl SyncStage {
    /// Stage name as used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStage::ComputeWindow => "compute_window",
            SyncStage::FetchRemote => "fetch_remote",
            SyncStage::Reconcile => "reconcile",
            SyncStage::PersistBatch => "persist_batch",
            SyncStage::Render => "render",
            SyncStage::Deliver => "deliver",
            SyncStage::Cleanup => "cleanup",
            SyncStage::Done => "done",
        }
    }
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// External side effects a run can leave behind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    /// The batch of a superseded run was deleted
    PriorBatchRemoved(String),
    /// The new batch was persisted
    BatchSaved(String),
    /// The new run record was persisted
    RunRecordSaved(String),
    /// The artifact was written to the local staging directory
    ArtifactStaged(String),
    /// The artifact was uploaded to the payroll server
    ArtifactDelivered(String),
}

/// Underlying cause of a failed run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncFailure {
    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// The latest run record ends after today
    #[error("Latest run ends on {prior_to}, which is after today ({today})")]
    InvalidWindow {
        prior_to: chrono::NaiveDate,
        today: chrono::NaiveDate,
    },

    /// Another run holds the run lock
    #[error("Another synchronization run is in progress: {0}")]
    RunInProgress(String),

    /// The run lock file could not be created
    #[error("Failed to take run lock: {0}")]
    Lock(String),

    /// An artifact name could not be built or parsed
    #[error("Invalid artifact name: {0}")]
    InvalidArtifact(String),

    /// No batch is stored under the requested artifact name
    #[error("No stored batch for artifact {0}")]
    UnknownArtifact(String),
}

impl From<ClientError> for SyncFailure {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Signing(e) => SyncFailure::Signing(e),
            ClientError::Transport(e) => SyncFailure::Transport(e),
        }
    }
}

/// A failed synchronization run
///
/// Carries the stage at which the run stopped and every side effect that had
/// already completed, so the caller can decide between retrying the whole run,
/// redelivering, or reconciling by hand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Synchronization failed at {stage}: {source}")]
pub struct SyncError {
    pub stage: SyncStage,
    pub completed: Vec<SideEffect>,
    #[source]
    pub source: SyncFailure,
}

impl SyncError {
    /// Creates a failure with no completed side effects
    pub fn new(stage: SyncStage, source: impl Into<SyncFailure>) -> Self {
        Self {
            stage,
            completed: Vec::new(),
            source: source.into(),
        }
    }

    /// Attaches the side effects completed before the failure
    pub fn with_completed(mut self, completed: Vec<SideEffect>) -> Self {
        self.completed = completed;
        self
    }

    /// True when no external state was touched and the run can be retried in full
    pub fn is_side_effect_free(&self) -> bool {
        self.completed.is_empty()
    }

    /// True when the run failed because a bounded step ran out of time
    pub fn is_timeout(&self) -> bool {
        matches!(
            self.source,
            SyncFailure::Transport(TransportError::Timeout(_))
                | SyncFailure::Transfer(TransferError::Timeout(_))
        )
    }
}

impl From<std::io::Error> for PayeError {
    fn from(err: std::io::Error) -> Self {
        PayeError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PayeError {
    fn from(err: serde_json::Error) -> Self {
        PayeError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for PayeError {
    fn from(err: toml::de::Error) -> Self {
        PayeError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paye_error_display() {
        let err = PayeError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_client_error_into_sync_failure() {
        let err = ClientError::Signing(SigningError::MissingHeader("host".to_string()));
        let failure: SyncFailure = err.into();
        assert!(matches!(
            failure,
            SyncFailure::Signing(SigningError::MissingHeader(_))
        ));
    }

    #[test]
    fn test_sync_error_display_includes_stage() {
        let err = SyncError::new(
            SyncStage::FetchRemote,
            TransportError::Status {
                status: 503,
                body: "unavailable".to_string(),
            },
        );
        let msg = err.to_string();
        assert!(msg.contains("fetch_remote"));
        assert!(msg.contains("503"));
        assert!(err.is_side_effect_free());
    }

    #[test]
    fn test_sync_error_with_completed() {
        let err = SyncError::new(
            SyncStage::Deliver,
            TransferError::UploadFailure("550".to_string()),
        )
        .with_completed(vec![SideEffect::BatchSaved("RPN_20240301".to_string())]);

        assert!(!err.is_side_effect_free());
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_sync_error_timeout() {
        let err = SyncError::new(
            SyncStage::FetchRemote,
            TransportError::Timeout("60s".to_string()),
        );
        assert!(err.is_timeout());
    }

    #[test]
    fn test_transport_error_retryable() {
        assert!(TransportError::Network("reset".to_string()).is_retryable());
        assert!(TransportError::Status {
            status: 502,
            body: String::new()
        }
        .is_retryable());
        assert!(!TransportError::Status {
            status: 401,
            body: String::new()
        }
        .is_retryable());
        assert!(!TransportError::InvalidResponse("bad".to_string()).is_retryable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: PayeError = io_err.into();
        assert!(matches!(err, PayeError::Io(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: PayeError = toml_err.into();
        assert!(err.to_string().contains("TOML parse error"));
    }
}
