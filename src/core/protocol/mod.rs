//! Protocol implementations
//!
//! The receiver side of the XMODEM/YMODEM file-transfer family: dialect
//! detection, block framing, YMODEM batch metadata, and the retry/abort
//! policy that ties them together into a session.

pub mod xymodem;
