//! Run store abstraction layer
//!
//! A trait-based store for run records and notification batches with
//! PostgreSQL and in-memory backends.

pub mod factory;
pub mod memory;
pub mod traits;

pub use factory::create_run_store;
pub use memory::MemoryRunStore;
pub use traits::{CommitPlan, RunStore};
