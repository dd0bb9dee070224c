// PAYE Sync - Revenue Payroll Notification synchronization
// Copyright (c) 2025 PAYE Sync Contributors
// Licensed under the MIT License

//! # PAYE Sync
//!
//! PAYE Sync fetches Revenue Payroll Notifications (RPNs) for an employer
//! from the Revenue PAYE REST API, keeps a record of every run, and delivers
//! each run's notifications as an XML file to a payroll system over FTP.
//!
//! ## Overview
//!
//! - **Signing**: every API request carries an RSA `Signature` header built
//!   from a canonical string of selected headers, using the employer's
//!   ROS certificate key
//! - **Synchronization**: each run covers the dates since the previous run
//!   ended, so successive runs are contiguous; a same-day re-run replaces
//!   the day's artifact instead of duplicating it
//! - **Persistence**: run records and fetched batches live in PostgreSQL
//!   (or in memory for embedding and tests)
//! - **Delivery**: the batch is rendered to `RPN_YYYYMMDD.XML`, uploaded,
//!   and the local copy removed
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Signing, window computation, the run engine, rendering, transfer
//! - [`adapters`] - Revenue API, run stores, FTP
//! - [`domain`] - Domain types, identifiers and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use paye_sync::adapters::revenue::{PayeClient, ReqwestTransport};
//! use paye_sync::adapters::store::create_run_store;
//! use paye_sync::adapters::transfer::FtpConnector;
//! use paye_sync::config::load_config;
//! use paye_sync::core::signing::RequestSigner;
//! use paye_sync::core::state::StateManager;
//! use paye_sync::core::sync::{SyncEngine, SyncSettings};
//! use paye_sync::core::transfer::TransferPipeline;
//! use paye_sync::domain::CertificateContext;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("paye-sync.toml")?;
//!
//!     let certificate = CertificateContext::from_config(config.active_certificate()?)?;
//!     let client = PayeClient::new(
//!         Arc::new(ReqwestTransport::new(&config.revenue)?),
//!         RequestSigner::new(config.revenue.signature_algorithm),
//!         certificate,
//!         &config.revenue.api_path,
//!     );
//!     let store = create_run_store(&config).await?;
//!     let transfer = TransferPipeline::from_config(
//!         Arc::new(FtpConnector::from_config(&config.transfer)),
//!         &config.sync,
//!         &config.transfer,
//!     );
//!
//!     let engine = SyncEngine::new(
//!         client,
//!         StateManager::new(store),
//!         transfer,
//!         SyncSettings::from_config(&config.sync),
//!     );
//!
//!     let outcome = engine.run().await?;
//!     println!("Delivered {}", outcome.artifact);
//!     Ok(())
//! }
//! ```
//!
//! ## Signing a request on its own
//!
//! ```rust,no_run
//! use paye_sync::core::signing::{sign, RequestDescriptor, SignatureAlgorithm};
//! use paye_sync::domain::CertificateContext;
//! use chrono::Utc;
//!
//! # fn example(certificate: &CertificateContext) -> Result<(), Box<dyn std::error::Error>> {
//! let mut request = RequestDescriptor::get("/paye-employers/v1/rest/rpn/8000242TH/2024");
//! request.prepare("softwaretest.ros.ie", Utc::now(), SignatureAlgorithm::RsaSha512);
//! let header = sign(&request, certificate)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! A failed run is a [`domain::SyncError`]: the stage it stopped at, the
//! underlying cause, and the side effects already completed. Failures
//! before anything was persisted leave no trace and the run can be repeated.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
