//! RPN lookup commands
//!
//! Signed lookups against the RPN endpoint, printed in the transfer (XML)
//! format, and RPN creation for new employments, printed as JSON.

use super::payroll::read_payload;
use super::{build_client, current_tax_year, EXIT_CONFIG, EXIT_CONNECTION, EXIT_OK, EXIT_SYNC_FAILED};
use crate::config::load_config;
use crate::core::render::render_batch;
use crate::domain::errors::{ClientError, TransportError};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Arguments for the rpn command
#[derive(Args, Debug)]
pub struct RpnArgs {
    #[command(subcommand)]
    pub command: RpnCommand,
}

#[derive(Subcommand, Debug)]
pub enum RpnCommand {
    /// Look up the RPNs of the employer
    Employer {
        /// Tax year (defaults to the current year)
        #[arg(long)]
        tax_year: Option<i32>,

        /// Only RPNs updated on or after this date (YYYY-MM-DD)
        #[arg(long)]
        since: Option<NaiveDate>,

        /// Restrict to these employee ids (comma-separated)
        #[arg(long, value_delimiter = ',')]
        employee_ids: Vec<String>,
    },

    /// Look up the RPN of one employee
    Employee {
        /// Employee PPSN
        ppsn: String,

        /// Tax year (defaults to the current year)
        #[arg(long)]
        tax_year: Option<i32>,
    },

    /// Create RPNs for new employments from a JSON file
    Create {
        /// JSON payload file
        #[arg(long)]
        payload: PathBuf,

        /// Tax year (defaults to the current year)
        #[arg(long)]
        tax_year: Option<i32>,
    },
}

impl RpnArgs {
    /// Execute the rpn command
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

        let result = match &self.command {
            RpnCommand::Employer {
                tax_year,
                since,
                employee_ids,
            } => {
                let year = tax_year.unwrap_or_else(current_tax_year);
                tracing::info!(tax_year = year, since = ?since, "Looking up employer RPNs");
                match client
                    .lookup_rpns_by_employer(year, *since, employee_ids)
                    .await
                {
                    Ok(response) => Ok(render_batch(&response)?),
                    Err(e) => Err(e),
                }
            }
            RpnCommand::Employee { ppsn, tax_year } => {
                let year = tax_year.unwrap_or_else(current_tax_year);
                tracing::info!(tax_year = year, "Looking up employee RPN");
                match client.lookup_rpn_by_employee(year, ppsn).await {
                    Ok(response) => Ok(render_batch(&response)?),
                    Err(e) => Err(e),
                }
            }
            RpnCommand::Create { payload, tax_year } => {
                let body = match read_payload(payload) {
                    Ok(b) => b,
                    Err(e) => {
                        println!("❌ Failed to read payload {}", payload.display());
                        println!("   Error: {e}");
                        return Ok(EXIT_CONFIG);
                    }
                };
                let year = tax_year.unwrap_or_else(current_tax_year);
                tracing::info!(tax_year = year, "Creating RPNs");
                match client.create_rpn(year, &body).await {
                    Ok(value) => Ok(serde_json::to_string_pretty(&value)?),
                    Err(e) => Err(e),
                }
            }
        };

        match result {
            Ok(output) => {
                println!("{output}");
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_client_error(&e)),
        }
    }
}

/// Prints a failed API call and returns its exit code
pub(crate) fn report_client_error(err: &ClientError) -> i32 {
    crate::log_error_with_context!(err, "Revenue API call failed");
    println!("❌ Revenue API call failed");
    println!("   Error: {err}");
    match err {
        ClientError::Transport(TransportError::Network(_) | TransportError::Timeout(_)) => {
            EXIT_CONNECTION
        }
        ClientError::Signing(_) => EXIT_CONFIG,
        ClientError::Transport(_) => EXIT_SYNC_FAILED,
    }
}
