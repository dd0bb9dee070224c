//! Sync command implementation
//!
//! Runs one synchronization and prints the delivered artifact name.

use super::{build_client, build_engine, print_sync_error, sync_exit_code, EXIT_CONFIG, EXIT_CONNECTION, EXIT_OK};
use crate::adapters::store::create_run_store;
use crate::config::load_config;
use clap::Args;

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {}

impl SyncArgs {
    /// Execute the sync command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Starting sync command");

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

        match engine.run().await {
            Ok(outcome) => {
                println!("✅ Synchronization completed");
                println!("   Artifact: {}", outcome.artifact);
                println!("   Window: {}", outcome.window);
                println!("   RPNs: {}", outcome.item_count);
                println!("   Delivered to: {}", outcome.remote_path);
                if let Some(prior) = &outcome.superseded {
                    println!("   Replaced: {prior}");
                }
                if let Some(err) = &outcome.cleanup_error {
                    println!("⚠️  Staged file was not removed: {err}");
                }
                Ok(EXIT_OK)
            }
            Err(e) => {
                crate::log_error_with_context!(e, "Synchronization run failed");
                print_sync_error(&e);
                Ok(sync_exit_code(&e))
            }
        }
    }
}
