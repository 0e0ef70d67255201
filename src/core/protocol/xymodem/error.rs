use thiserror::Error;

/// Every fallible operation in the receiver engine returns this type.
///
/// `Cancelled` is the "user cancelled" outcome spec'd as one of the two
/// control-flow exits (`ok | user_cancel | abort(reason)`); every other
/// variant is an "abort(reason)" exit. Callers that only care about the
/// distinction can match on `XyError::Cancelled` and treat the rest
/// uniformly.
#[derive(Error, Debug)]
pub enum XyError {
    /// The host's `IoPort` reported the operator cancelled the transfer.
    #[error("cancelled by user")]
    Cancelled,

    /// No header byte (or no byte at all) arrived within the dialect's
    /// governing timeout.
    #[error("timed out waiting for data")]
    Timeout,

    /// A frame failed to parse: bad header byte, bad block-number
    /// complement, or a checksum/CRC mismatch.
    #[error("framing error: {0}")]
    Framing(String),

    /// A block number arrived that the per-file state machine has no
    /// valid transition for (not a duplicate, not prev+1, not a fresh
    /// file's 0/1).
    #[error("out of sequence block number")]
    OutOfSequence,

    /// The sender sent two consecutive CAN bytes.
    #[error("cancel received from sender")]
    SenderCancelled,

    /// Too many consecutive recoverable errors on one block.
    #[error("too many errors")]
    TooManyErrors,

    /// No sender responded to the handshake ladder.
    #[error("handshake timed out")]
    HandshakeTimedOut,

    /// A received file exceeded its declared length by more than one
    /// partial block, under `OverrunPolicy::Error`.
    #[error("received data exceeded declared file length")]
    Overrun,

    /// The file sink (create/write/truncate/set-mtime/close/delete)
    /// failed.
    #[error("file sink error: {0}")]
    Sink(#[from] std::io::Error),
}
