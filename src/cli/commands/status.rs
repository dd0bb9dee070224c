//! Status command implementation
//!
//! Shows the most recent run records, newest first.

use super::{EXIT_CONFIG, EXIT_CONNECTION, EXIT_FATAL, EXIT_OK};
use crate::adapters::store::create_run_store;
use crate::config::load_config;
use crate::core::state::{RunRecord, StateManager};
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Number of runs to show
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking synchronization status");

        println!("📊 Synchronization Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {}", e);
                return Ok(EXIT_CONFIG);
            }
        };

        let store = match create_run_store(&config).await {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to connect to the run store");
                println!("   Error: {}", e);
                return Ok(EXIT_CONNECTION);
            }
        };

        let runs = match StateManager::new(store).recent_runs(self.limit).await {
            Ok(r) => r,
            Err(e) => {
                println!("❌ Failed to load run records");
                println!("   Error: {}", e);
                return Ok(EXIT_FATAL);
            }
        };

        if runs.is_empty() {
            println!("No synchronization history found.");
            println!("Run 'paye-sync sync' to fetch the first batch.");
            return Ok(EXIT_OK);
        }

        println!("Found {} run(s):", runs.len());
        println!();
        print!("{}", format_table(&runs));
        println!();
        Ok(EXIT_OK)
    }
}

fn format_table(runs: &[RunRecord]) -> String {
    let mut out = format!(
        "{:<16} {:<12} {:<12} {:<8} {:<22} {:<16}\n",
        "Artifact", "From", "To", "RPNs", "Imported", "Replaced"
    );
    out.push_str(&"-".repeat(90));
    out.push('\n');

    for run in runs {
        out.push_str(&format!(
            "{:<16} {:<12} {:<12} {:<8} {:<22} {:<16}\n",
            run.artifact_name.as_str(),
            run.from_date,
            run.to_date,
            run.item_count,
            run.date_imported.format("%Y-%m-%d %H:%M:%S"),
            run.superseded.as_ref().map(|a| a.as_str()).unwrap_or("-")
        ));
    }
    out
}
