// Run state: run records and the watermark

pub mod manager;
pub mod run_record;

pub use manager::StateManager;
pub use run_record::{RunRecord, RunRecordBuilder};
