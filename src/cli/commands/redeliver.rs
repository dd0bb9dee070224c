//! Redeliver command implementation
//!
//! Renders a stored batch again and uploads it, for runs that persisted
//! their results but failed to deliver them.

use super::{build_client, build_engine, print_sync_error, sync_exit_code, EXIT_CONFIG, EXIT_CONNECTION, EXIT_OK};
use crate::adapters::store::create_run_store;
use crate::config::load_config;
use crate::domain::ids::ArtifactName;
use clap::Args;

/// Arguments for the redeliver command
#[derive(Args, Debug)]
pub struct RedeliverArgs {
    /// Artifact name, for example RPN_20240301
    pub artifact: String,
}

impl RedeliverArgs {
    /// Execute the redeliver command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let artifact = match ArtifactName::new(self.artifact.as_str()) {
            Ok(a) => a,
            Err(e) => {
                println!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };
        tracing::info!(artifact = %artifact, "Starting redeliver command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let client = match build_client(&config) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to set up the Revenue client");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let store = match create_run_store(&config).await {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to connect to the run store");
                println!("   Error: {e}");
                return Ok(EXIT_CONNECTION);
            }
        };

        let engine = build_engine(&config, client, store);

        match engine.redeliver(&artifact).await {
            Ok(redelivery) => {
                println!("✅ Redelivered {}", redelivery.artifact);
                println!("   Delivered to: {}", redelivery.remote_path);
                if let Some(err) = &redelivery.cleanup_error {
                    println!("⚠️  Staged file was not removed: {err}");
                }
                Ok(EXIT_OK)
            }
            Err(e) => {
                crate::log_error_with_context!(e, "Redelivery failed");
                print_sync_error(&e);
                Ok(sync_exit_code(&e))
            }
        }
    }
}
