//! CLI command implementations
//!
//! Commands return process exit codes: 0 success, 2 configuration error,
//! 3 synchronization failed, 4 connection error, 5 fatal error.

pub mod init;
pub mod payroll;
pub mod redeliver;
pub mod rpn;
pub mod schedule;
pub mod status;
pub mod sync;
pub mod validate;

use crate::adapters::revenue::{PayeClient, ReqwestTransport};
use crate::adapters::store::RunStore;
use crate::adapters::transfer::FtpConnector;
use crate::config::PayeSyncConfig;
use crate::core::signing::RequestSigner;
use crate::core::state::StateManager;
use crate::core::sync::{SyncEngine, SyncSettings};
use crate::core::transfer::TransferPipeline;
use crate::domain::errors::{StoreError, SyncError, SyncFailure, TransferError, TransportError};
use crate::domain::CertificateContext;
use chrono::Datelike;
use std::sync::Arc;

pub const EXIT_OK: i32 = 0;
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_SYNC_FAILED: i32 = 3;
pub const EXIT_CONNECTION: i32 = 4;
pub const EXIT_FATAL: i32 = 5;

/// Builds the signed API client for the active certificate
///
/// The certificate key is decrypted here so a wrong password is reported
/// before any request is made.
pub(crate) fn build_client(config: &PayeSyncConfig) -> anyhow::Result<PayeClient> {
    let certificate_config = config.active_certificate().map_err(anyhow::Error::msg)?;
    let certificate = CertificateContext::from_config(certificate_config)?;
    certificate.private_key()?;

    let transport = Arc::new(ReqwestTransport::new(&config.revenue)?);
    Ok(PayeClient::new(
        transport,
        RequestSigner::new(config.revenue.signature_algorithm),
        certificate,
        &config.revenue.api_path,
    ))
}

/// Wires the engine from configuration
pub(crate) fn build_engine(
    config: &PayeSyncConfig,
    client: PayeClient,
    store: Arc<dyn RunStore>,
) -> SyncEngine {
    let connector = Arc::new(FtpConnector::from_config(&config.transfer));
    SyncEngine::new(
        client,
        StateManager::new(store),
        TransferPipeline::from_config(connector, &config.sync, &config.transfer),
        SyncSettings::from_config(&config.sync),
    )
}

/// Exit code for a failed run
pub(crate) fn sync_exit_code(err: &SyncError) -> i32 {
    match &err.source {
        SyncFailure::Store(StoreError::ConnectionFailure(_))
        | SyncFailure::Transport(TransportError::Network(_) | TransportError::Timeout(_))
        | SyncFailure::Transfer(TransferError::ConnectFailure(_) | TransferError::Timeout(_)) => {
            EXIT_CONNECTION
        }
        _ => EXIT_SYNC_FAILED,
    }
}

/// Prints a failed run with the side effects it left behind
pub(crate) fn print_sync_error(err: &SyncError) {
    println!("❌ Synchronization failed at stage '{}'", err.stage);
    println!("   Error: {}", err.source);
    if err.is_side_effect_free() {
        println!("   No changes were made; the run can be repeated.");
    } else {
        println!("   Completed before the failure:");
        for effect in &err.completed {
            println!("     - {:?}", effect);
        }
    }
}

pub(crate) fn current_tax_year() -> i32 {
    chrono::Utc::now().year()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{SideEffect, SyncStage};

    #[test]
    fn test_sync_exit_codes() {
        let network = SyncError::new(
            SyncStage::FetchRemote,
            TransportError::Network("reset".to_string()),
        );
        assert_eq!(sync_exit_code(&network), EXIT_CONNECTION);

        let rejected = SyncError::new(
            SyncStage::FetchRemote,
            TransportError::Status {
                status: 403,
                body: String::new(),
            },
        );
        assert_eq!(sync_exit_code(&rejected), EXIT_SYNC_FAILED);

        let upload = SyncError::new(
            SyncStage::Deliver,
            TransferError::UploadFailure("550".to_string()),
        )
        .with_completed(vec![SideEffect::BatchSaved("RPN_20240301".to_string())]);
        assert_eq!(sync_exit_code(&upload), EXIT_SYNC_FAILED);
    }
}
