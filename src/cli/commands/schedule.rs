//! Schedule command implementation
//!
//! Runs synchronizations on a fixed interval until Ctrl+C or SIGTERM.

use super::{build_client, build_engine, EXIT_CONFIG, EXIT_CONNECTION, EXIT_OK, EXIT_SYNC_FAILED};
use crate::adapters::store::create_run_store;
use crate::config::load_config;
use crate::core::schedule::SyncScheduler;
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Arguments for the schedule command
#[derive(Args, Debug)]
pub struct ScheduleArgs {
    /// Minutes between runs
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_minutes: u64,
}

impl ScheduleArgs {
    /// Execute the schedule command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(interval_minutes = self.interval_minutes, "Starting scheduler");

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

        let engine = Arc::new(build_engine(&config, client, store));
        let scheduler =
            SyncScheduler::new(engine, Duration::from_secs(self.interval_minutes * 60));

        println!(
            "⏱️  Running every {} minute(s); press Ctrl+C to stop",
            self.interval_minutes
        );
        let summary = scheduler.run(shutdown_signal).await;

        println!();
        println!("Scheduler stopped");
        println!("   Succeeded: {}", summary.succeeded);
        println!("   Failed: {}", summary.failed);

        if summary.failed > 0 {
            Ok(EXIT_SYNC_FAILED)
        } else {
            Ok(EXIT_OK)
        }
    }
}
