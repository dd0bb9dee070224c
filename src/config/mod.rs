//! Configuration management for PAYE Sync.
//!
//! TOML configuration with `${VAR_NAME}` substitution, `PAYE_SYNC_*`
//! environment overrides and validation on load.
//!
//! # Example Configuration
//!
//! ```toml
//! environment = "test"
//! store_target = "postgresql"
//!
//! [revenue]
//! base_url = "https://softwaretest.ros.ie"
//! active_certificate = 999963
//!
//! [[certificates]]
//! id = 999963
//! employer_number = "8000242TH"
//! name = "TEST CERT"
//! password = "${PAYE_SYNC_CERT_PASSWORD}"
//! key_path = "/etc/paye-sync/999963.pem"
//!
//! [postgresql]
//! connection_string = "${PAYE_SYNC_PG_CONNECTION}"
//!
//! [transfer]
//! host = "payroll.example.com"
//! username = "payroll"
//! password = "${PAYE_SYNC_FTP_PASSWORD}"
//! remote_directory = "/incoming/rpn"
//! ```
//!
//! ```rust,no_run
//! use paye_sync::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("paye-sync.toml")?;
//! println!("Revenue API: {}", config.revenue.base_url);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{
    ApplicationConfig, CertificateConfig, Environment, LoggingConfig, PayeSyncConfig,
    PostgreSQLConfig, RetryConfig, RevenueConfig, StoreTarget, SyncConfig, TransferConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
