//! CLI Exit Codes
//!
//! Standard exit codes for CLI operations and automation, trimmed to the
//! codes a serial receive session can actually produce.

use std::process::ExitCode;

use crate::core::protocol::xymodem::XyError;
use crate::core::transport::TransportError;

/// Exit code constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCodes;

impl ExitCodes {
    /// Success
    pub const SUCCESS: u8 = 0;

    /// General error
    pub const ERROR: u8 = 1;

    /// Invalid arguments
    pub const INVALID_ARGS: u8 = 2;

    /// Connection timeout / no header byte within the protocol's deadline
    pub const TIMEOUT: u8 = 4;

    /// Permission denied opening the port
    pub const PERMISSION_DENIED: u8 = 7;

    /// Framing/desync/checksum error, or too many consecutive errors
    pub const PROTOCOL_ERROR: u8 = 9;

    /// A file failed to transfer (sink error, overrun under
    /// `OverrunPolicy::Error`)
    pub const TRANSFER_FAILED: u8 = 10;

    /// The operator cancelled the transfer
    pub const CANCELLED: u8 = 11;

    /// The named serial port does not exist
    pub const PORT_NOT_FOUND: u8 = 14;

    /// Internal error
    pub const INTERNAL_ERROR: u8 = 127;
}

/// CLI operation result
#[derive(Debug)]
pub enum CliResult {
    /// Success with optional message
    Success(Option<String>),

    /// Error with code and message
    Error(u8, String),
}

impl CliResult {
    /// A bare success.
    pub fn success() -> Self {
        Self::Success(None)
    }

    /// A success with an informational message.
    pub fn success_with_message(msg: impl Into<String>) -> Self {
        Self::Success(Some(msg.into()))
    }

    /// Get exit code
    pub fn code(&self) -> u8 {
        match self {
            Self::Success(_) => ExitCodes::SUCCESS,
            Self::Error(code, _) => *code,
        }
    }

    /// Get message
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success(Some(msg)) => Some(msg),
            Self::Error(_, msg) => Some(msg),
            _ => None,
        }
    }

    /// Convert to ExitCode
    pub fn to_exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }

    /// Is success?
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl From<&XyError> for CliResult {
    fn from(err: &XyError) -> Self {
        let code = match err {
            XyError::Cancelled => ExitCodes::CANCELLED,
            XyError::Timeout | XyError::HandshakeTimedOut => ExitCodes::TIMEOUT,
            XyError::Framing(_) | XyError::OutOfSequence | XyError::TooManyErrors => {
                ExitCodes::PROTOCOL_ERROR
            }
            XyError::SenderCancelled => ExitCodes::TRANSFER_FAILED,
            XyError::Overrun | XyError::Sink(_) => ExitCodes::TRANSFER_FAILED,
        };
        Self::Error(code, err.to_string())
    }
}

impl From<&TransportError> for CliResult {
    fn from(err: &TransportError) -> Self {
        let code = match err {
            TransportError::PortNotFound(_) => ExitCodes::PORT_NOT_FOUND,
            TransportError::PermissionDenied(_) => ExitCodes::PERMISSION_DENIED,
            TransportError::Timeout(_) => ExitCodes::TIMEOUT,
            _ => ExitCodes::ERROR,
        };
        Self::Error(code, err.to_string())
    }
}

/// Exit code description
pub fn exit_code_description(code: u8) -> &'static str {
    match code {
        0 => "Success",
        1 => "General error",
        2 => "Invalid arguments",
        4 => "Timed out",
        7 => "Permission denied",
        9 => "Protocol error",
        10 => "Transfer failed",
        11 => "Operation cancelled",
        14 => "Port not found",
        127 => "Internal error",
        _ => "Unknown error",
    }
}

/// Print exit code table
pub fn print_exit_codes() {
    println!("Exit Codes:");
    for code in [0, 1, 2, 4, 7, 9, 10, 11, 14, 127] {
        println!("  {:>3}  {}", code, exit_code_description(code));
    }
}
