//! File-transfer session abstraction

use crate::domain::errors::TransferError;
use async_trait::async_trait;

/// Opens sessions against the remote payroll server
///
/// Implementations hold the host and credentials.
#[async_trait]
pub trait TransferConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn TransferSession>, TransferError>;
}

/// An open file-transfer session
#[async_trait]
pub trait TransferSession: Send {
    /// Uploads `contents` to `remote_path`
    async fn put(&mut self, contents: Vec<u8>, remote_path: &str) -> Result<(), TransferError>;

    /// Ends the session; calling it on a closed session is a no-op
    async fn close(&mut self) -> Result<(), TransferError>;
}
