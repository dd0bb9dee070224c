//! Synchronization runs: window computation and the run engine

pub mod engine;
pub mod window;

pub use engine::{Redelivery, SyncEngine, SyncOutcome, SyncSettings};
pub use window::{compute_window, CoverageWindow, WindowPlan};
