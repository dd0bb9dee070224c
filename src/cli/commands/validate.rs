//! Validate config command implementation
//!
//! Loads and validates the configuration, then checks that the active
//! certificate's private key can be decrypted.

use super::{EXIT_CONFIG, EXIT_OK};
use crate::config::load_config;
use crate::config::schema::StoreTarget;
use crate::domain::CertificateContext;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as part of loading
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let key_check = config
            .active_certificate()
            .map_err(anyhow::Error::msg)
            .and_then(|c| {
                let certificate = CertificateContext::from_config(c)?;
                certificate.private_key()?;
                Ok(())
            });
        match key_check {
            Ok(()) => println!("✅ Certificate key decrypted successfully"),
            Err(e) => {
                println!("❌ Certificate check failed");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        }

        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.environment);
        println!("  Log Level: {}", config.application.log_level);
        println!("  Revenue API: {}{}", config.revenue.base_url, config.revenue.api_path);
        println!("  Signature Algorithm: {}", config.revenue.signature_algorithm);
        println!("  Active Certificate: {}", config.revenue.active_certificate);
        println!("  Certificates: {}", config.certificates.len());

        match config.store_target {
            StoreTarget::PostgreSQL => {
                if let Some(ref pg_config) = config.postgresql {
                    use secrecy::ExposeSecret;
                    println!("  Store: PostgreSQL");
                    println!(
                        "  PostgreSQL Connection: {}",
                        pg_config
                            .connection_string
                            .expose_secret()
                            .as_str()
                            .split('@')
                            .next_back()
                            .unwrap_or("***")
                    );
                    println!("  Max Connections: {}", pg_config.max_connections);
                }
            }
            StoreTarget::Memory => println!("  Store: in-memory (run history is not kept)"),
        }

        println!("  Artifact: {}_YYYYMMDD.{}", config.sync.artifact_prefix, config.sync.artifact_extension);
        println!("  Staging Directory: {}", config.sync.staging_dir.display());
        println!(
            "  Transfer: {}:{}{}",
            config.transfer.host, config.transfer.port, config.transfer.remote_directory
        );
        println!();
        Ok(EXIT_OK)
    }
}
