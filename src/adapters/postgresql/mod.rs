//! PostgreSQL run store

pub mod adapter;
pub mod client;
pub mod models;

pub use adapter::PostgresRunStore;
pub use client::PostgreSQLClient;
