//! External system integrations for PAYE Sync
//!
//! - [`revenue`] - Signed client for the Revenue PAYE employer API
//! - [`store`] - Run store abstraction (trait-based) and its factory
//! - [`postgresql`] - PostgreSQL run store
//! - [`transfer`] - File-transfer sessions to the payroll server (FTP)
//!
//! Each integration sits behind a trait so the engine can be exercised
//! with in-memory implementations:
//!
//! ```rust,no_run
//! use paye_sync::adapters::store::{MemoryRunStore, RunStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store: Arc<dyn RunStore> = Arc::new(MemoryRunStore::new());
//! let latest = store.find_latest_run_record().await?;
//! assert!(latest.is_none());
//! # Ok(())
//! # }
//! ```

pub mod postgresql;
pub mod revenue;
pub mod store;
pub mod transfer;
