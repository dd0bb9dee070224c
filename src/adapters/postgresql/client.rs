//! PostgreSQL client implementation
//!
//! Wraps a deadpool connection pool. TLS is negotiated through native-tls
//! unless `ssl_mode = "disable"`.

use crate::config::schema::PostgreSQLConfig;
use crate::domain::errors::StoreError;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use postgres_native_tls::MakeTlsConnector;
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio_postgres::config::SslMode;
use tokio_postgres::{NoTls, Row};

/// PostgreSQL client with connection pooling
pub struct PostgreSQLClient {
    pool: Pool,
    config: PostgreSQLConfig,
}

impl PostgreSQLClient {
    /// Builds the pool; no connection is opened until first use
    ///
    /// # Errors
    ///
    /// [`StoreError::ConnectionFailure`] if the connection string cannot be
    /// parsed or the TLS connector or pool cannot be built.
    pub fn new(config: PostgreSQLConfig) -> Result<Self, StoreError> {
        let mut pg_config: tokio_postgres::Config = config
            .connection_string
            .expose_secret()
            .as_str()
            .parse()
            .map_err(|e| {
                StoreError::ConnectionFailure(format!(
                    "Invalid PostgreSQL connection string: {}",
                    e
                ))
            })?;
        pg_config.connect_timeout(Duration::from_secs(config.connection_timeout_seconds));

        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let manager = match config.ssl_mode.as_str() {
            "disable" => {
                pg_config.ssl_mode(SslMode::Disable);
                Manager::from_config(pg_config, NoTls, manager_config)
            }
            mode => {
                pg_config.ssl_mode(if mode == "prefer" {
                    SslMode::Prefer
                } else {
                    SslMode::Require
                });
                let connector = native_tls::TlsConnector::builder()
                    .danger_accept_invalid_certs(matches!(mode, "prefer" | "require"))
                    .danger_accept_invalid_hostnames(mode != "verify-full")
                    .build()
                    .map_err(|e| {
                        StoreError::ConnectionFailure(format!("Failed to build TLS connector: {}", e))
                    })?;
                Manager::from_config(pg_config, MakeTlsConnector::new(connector), manager_config)
            }
        };

        let timeout = Some(Duration::from_secs(config.connection_timeout_seconds));
        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .wait_timeout(timeout)
            .create_timeout(timeout)
            .recycle_timeout(timeout)
            .runtime(deadpool_postgres::Runtime::Tokio1)
            .build()
            .map_err(|e| {
                StoreError::ConnectionFailure(format!("Failed to create connection pool: {}", e))
            })?;

        Ok(Self { pool, config })
    }

    /// Runs `SELECT 1`
    pub async fn test_connection(&self) -> Result<(), StoreError> {
        let client = self.get_connection().await?;
        client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| StoreError::ConnectionFailure(format!("Connection test failed: {}", e)))?;

        tracing::info!(target = %self.connection_string_safe(), "PostgreSQL connection test successful");
        Ok(())
    }

    /// Creates the schema if it does not exist
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let client = self.get_connection().await?;
        let migration_sql = include_str!("../../../migrations/001_initial_schema.sql");

        client
            .batch_execute(migration_sql)
            .await
            .map_err(|e| StoreError::Query(format!("Failed to execute migration: {}", e)))?;

        tracing::info!("PostgreSQL schema initialized successfully");
        Ok(())
    }

    /// Checks out a pooled connection with the statement timeout applied
    pub async fn get_connection(&self) -> Result<deadpool_postgres::Object, StoreError> {
        let client = self.pool.get().await.map_err(|e| {
            StoreError::ConnectionFailure(format!("Failed to get connection from pool: {}", e))
        })?;

        let timeout_query = format!(
            "SET statement_timeout = {}",
            self.config.statement_timeout_seconds * 1000
        );
        client
            .batch_execute(&timeout_query)
            .await
            .map_err(|e| StoreError::Query(format!("Failed to set statement timeout: {}", e)))?;

        Ok(client)
    }

    pub async fn query(
        &self,
        query: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<Vec<Row>, StoreError> {
        let client = self.get_connection().await?;
        client
            .query(query, params)
            .await
            .map_err(|e| map_db_error(e, "Query failed"))
    }

    pub async fn execute(
        &self,
        statement: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<u64, StoreError> {
        let client = self.get_connection().await?;
        client
            .execute(statement, params)
            .await
            .map_err(|e| map_db_error(e, "Statement execution failed"))
    }

    /// Connection string with credentials removed, for logs
    pub fn connection_string_safe(&self) -> String {
        redact_connection_string(self.config.connection_string.expose_secret().as_str())
    }
}

/// Maps driver errors, keeping unique violations distinguishable
pub(crate) fn map_db_error(err: tokio_postgres::Error, context: &str) -> StoreError {
    if err.code() == Some(&tokio_postgres::error::SqlState::UNIQUE_VIOLATION) {
        return StoreError::DuplicateArtifact(
            err.as_db_error()
                .and_then(|db| db.detail())
                .unwrap_or("artifact_name")
                .to_string(),
        );
    }
    StoreError::Query(format!("{}: {}", context, err))
}

fn redact_connection_string(conn: &str) -> String {
    conn.rsplit_once('@')
        .map(|(_, host)| format!("postgresql://***@{}", host))
        .unwrap_or_else(|| "postgresql://***".to_string())
}
