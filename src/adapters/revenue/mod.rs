//! Revenue PAYE employer API adapter

pub mod client;
pub mod transport;

pub use client::PayeClient;
pub use transport::{ReqwestTransport, Transport, TransportResponse};
