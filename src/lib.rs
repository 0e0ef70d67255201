//! # xyrecv-core
//!
//! The receiver side of the XMODEM/YMODEM family of file-transfer
//! protocols: dialect detection (classic XMODEM, XMODEM-CRC, XMODEM-1K,
//! YMODEM batch, YMODEM-G), block framing and integrity checking, the
//! handshake ladder and per-block retry policy, YMODEM batch metadata, and
//! the graceful abort sequence — plus enough ZMODEM recognition to decline
//! a ZRQINIT handshake gracefully.
//!
//! The engine itself (`core::protocol::xymodem`) is transport-agnostic: it
//! is driven through an [`IoPort`](core::protocol::xymodem::IoPort) the
//! host supplies. `core::transport::serial` is this crate's one concrete
//! host, a blocking link over the `serialport` crate.
//!
//! ## Example
//!
//! ```rust,no_run
//! use xyrecv_core::core::protocol::xymodem::{Session, OverrunPolicy, StdFileSinkFactory};
//! use xyrecv_core::core::transport::{SerialConfig, SerialPort};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut port = SerialPort::open(SerialConfig::new("/dev/ttyUSB0", 115200))?;
//! let mut sinks = StdFileSinkFactory::new("./received")?;
//! let session = Session::new(OverrunPolicy::Ignore);
//! let downloads = session.receive_all(&mut port, &mut sinks)?;
//! for dl in downloads {
//!     println!("received {:?} ({} bytes)", dl.name, dl.bytes_written);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod core;

pub use crate::cli::ExitCodes;
pub use crate::config::ReceiverConfig;
pub use crate::core::protocol::xymodem::{
    Download, FileSink, FileSinkFactory, IoPort, OverrunPolicy, ProtocolDetector, ProtocolKind,
    ReadOutcome, Session, StdFileSink, StdFileSinkFactory, XyError, ZrqinitDetector,
};
pub use crate::core::transport::{SerialConfig, SerialFlowControl, SerialParity, SerialPort};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
