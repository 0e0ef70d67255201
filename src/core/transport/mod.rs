//! Serial transport: the real-world host for the receiver engine's `IoPort`.
//!
//! The engine in `core::protocol::xymodem` is transport-agnostic; this
//! module supplies the one concrete transport this crate ships with, a
//! blocking RS-232/USB-serial link via the `serialport` crate.

mod serial;

pub use serial::{list_ports, SerialConfig, SerialFlowControl, SerialParity, SerialPort};

use thiserror::Error;

/// Transport error types
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connection failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection timeout
    #[error("Connection timeout after {0} seconds")]
    Timeout(u64),

    /// Port not found
    #[error("Port not found: {0}")]
    PortNotFound(String),

    /// Permission denied
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Port already in use
    #[error("Port already in use: {0}")]
    PortInUse(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Not connected
    #[error("Not connected")]
    NotConnected,
}
