//! XMODEM/YMODEM receiver engine
//!
//! Implements the receiver side of the XMODEM/YMODEM protocol family over an
//! abstract byte channel: dialect detection, block framing, the per-block
//! retry policy, YMODEM batch metadata, and the graceful abort sequence.
//! Also recognizes the ZMODEM ZRQINIT frame so a host can detect (and
//! decline) an incoming ZMODEM session before entering this engine.
//!
//! The sender side of these protocols, full ZMODEM, and any flow control
//! beyond passive reliance on the transport are out of scope.

mod block0;
mod checksum;
mod consts;
mod detector;
mod download;
mod error;
mod framer;
mod io;
mod session;
mod sink;

#[cfg(test)]
mod test_support;

pub use block0::{Block0, Block0Metadata};
pub use checksum::{checksum8, crc16_xmodem};
pub use detector::{ProtocolDetector, ProtocolKind};
pub use download::Download;
pub use error::XyError;
pub use io::{IoPort, ReadOutcome};
pub use session::{OverrunPolicy, Session};
pub use sink::{FileSink, FileSinkFactory, StdFileSink, StdFileSinkFactory};

#[cfg(test)]
pub use test_support::{ScriptedPort, ScriptEvent};

/// ZMODEM's request-init frame, recognized so a receiver can decline it.
pub mod zrqinit;
pub use zrqinit::ZrqinitDetector;
