//! Payroll commands
//!
//! Payroll run and submission status checks and payroll submissions,
//! printed as JSON.

use super::rpn::report_client_error;
use super::{build_client, current_tax_year, EXIT_CONFIG, EXIT_OK};
use crate::config::load_config;
use crate::domain::errors::TransportError;
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

/// Arguments for the payroll command
#[derive(Args, Debug)]
pub struct PayrollArgs {
    /// Tax year (defaults to the current year)
    #[arg(long, global = true)]
    pub tax_year: Option<i32>,

    #[command(subcommand)]
    pub command: PayrollCommand,
}

#[derive(Subcommand, Debug)]
pub enum PayrollCommand {
    /// Status of a payroll run
    RunStatus {
        /// Payroll run reference
        run: String,
    },

    /// Status of a payroll submission
    SubmissionStatus {
        /// Payroll run reference
        run: String,
        /// Submission id
        submission: String,
    },

    /// Submit a payroll run from a JSON file
    Submit {
        /// Payroll run reference
        run: String,
        /// Submission id
        submission: String,
        /// JSON payload file
        #[arg(long)]
        payload: PathBuf,
    },
}

impl PayrollArgs {
    /// Execute the payroll command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
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

        let year = self.tax_year.unwrap_or_else(current_tax_year);

        let result = match &self.command {
            PayrollCommand::RunStatus { run } => client.check_payroll_run(year, run).await,
            PayrollCommand::SubmissionStatus { run, submission } => {
                client.check_payroll_submission(year, run, submission).await
            }
            PayrollCommand::Submit {
                run,
                submission,
                payload,
            } => {
                let payload = match read_payload(payload) {
                    Ok(p) => p,
                    Err(e) => {
                        println!("❌ Failed to read payload {}", payload.display());
                        println!("   Error: {e}");
                        return Ok(EXIT_CONFIG);
                    }
                };
                tracing::info!(run = %run, submission = %submission, "Submitting payroll");
                match client
                    .create_payroll_submission(year, run, submission, &payload)
                    .await
                {
                    Ok(result) => serde_json::to_value(result).map_err(|e| {
                        TransportError::InvalidResponse(e.to_string()).into()
                    }),
                    Err(e) => Err(e),
                }
            }
        };

        match result {
            Ok(value) => {
                println!("{}", serde_json::to_string_pretty(&value)?);
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_client_error(&e)),
        }
    }
}

pub(crate) fn read_payload(path: &Path) -> anyhow::Result<serde_json::Value> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
