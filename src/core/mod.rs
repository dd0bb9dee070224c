//! Core business logic for PAYE Sync
//!
//! # Modules
//!
//! - [`signing`] - Canonical signing strings and the `Signature` header
//! - [`sync`] - Coverage windows and the synchronization engine
//! - [`state`] - Run records (the watermark) and stored batches
//! - [`render`] - Rendering batches to the transfer file format
//! - [`transfer`] - Staging, delivery and cleanup of artifacts
//! - [`schedule`] - Run lock and periodic scheduling
//!
//! # Run workflow
//!
//! 1. **Compute window**: start where the latest run ended, end today
//! 2. **Fetch**: signed RPN lookup for notifications updated since the window start
//! 3. **Reconcile**: drop the batch of a superseded same-day run
//! 4. **Persist**: store the batch, then the run record
//! 5. **Render**: write the XML artifact to the staging directory
//! 6. **Deliver**: upload it to the payroll server
//! 7. **Cleanup**: remove the staged file
//!
//! # Example
//!
//! ```rust,no_run
//! use paye_sync::core::sync::SyncEngine;
//!
//! # async fn example(engine: SyncEngine) -> Result<(), Box<dyn std::error::Error>> {
//! let outcome = engine.run().await?;
//! println!("Delivered {} ({} RPNs)", outcome.artifact, outcome.item_count);
//! # Ok(())
//! # }
//! ```

pub mod render;
pub mod schedule;
pub mod signing;
pub mod state;
pub mod sync;
pub mod transfer;
