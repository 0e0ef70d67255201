//! Core module
//!
//! - `protocol`: the XMODEM/YMODEM receiver engine
//! - `transport`: the serial link that hosts it

pub mod protocol;
pub mod transport;
