//! File transfer to the payroll server

pub mod ftp;
pub mod traits;

pub use ftp::FtpConnector;
pub use traits::{TransferConnector, TransferSession};
