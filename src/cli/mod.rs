//! CLI interface and argument parsing

pub mod commands;

use clap::{Parser, Subcommand};

/// PAYE Sync - Revenue Payroll Notification synchronization
#[derive(Parser, Debug)]
#[command(name = "paye-sync")]
#[command(version, about, long_about = None)]
#[command(author = "PAYE Sync Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "paye-sync.toml", env = "PAYE_SYNC_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "PAYE_SYNC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one synchronization: fetch, persist, render and deliver
    Sync(commands::sync::SyncArgs),

    /// Run synchronizations periodically until interrupted
    Schedule(commands::schedule::ScheduleArgs),

    /// Deliver a stored batch again
    Redeliver(commands::redeliver::RedeliverArgs),

    /// Show recent synchronization runs
    Status(commands::status::StatusArgs),

    /// Look up RPNs
    Rpn(commands::rpn::RpnArgs),

    /// Payroll run and submission operations
    Payroll(commands::payroll::PayrollArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
