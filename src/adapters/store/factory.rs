//! Run store factory

use crate::adapters::postgresql::{PostgreSQLClient, PostgresRunStore};
use crate::adapters::store::memory::MemoryRunStore;
use crate::adapters::store::traits::RunStore;
use crate::config::schema::{PayeSyncConfig, StoreTarget};
use crate::domain::{PayeError, Result};
use std::sync::Arc;

/// Creates the run store selected by `store_target`
///
/// For PostgreSQL the connection is tested and the schema created.
pub async fn create_run_store(config: &PayeSyncConfig) -> Result<Arc<dyn RunStore>> {
    match config.store_target {
        StoreTarget::PostgreSQL => {
            let pg_config = config.postgresql.as_ref().ok_or_else(|| {
                PayeError::Configuration(
                    "postgresql configuration is required when store_target = 'postgresql'"
                        .to_string(),
                )
            })?;

            tracing::info!("Creating PostgreSQL run store");
            let client = PostgreSQLClient::new(pg_config.clone())?;
            client.test_connection().await?;
            client.ensure_schema().await?;

            Ok(Arc::new(PostgresRunStore::new(client)))
        }
        StoreTarget::Memory => {
            tracing::warn!("Using in-memory run store; run history is lost on exit");
            Ok(Arc::new(MemoryRunStore::new()))
        }
    }
}
