use std::time::Duration;

use super::download::Download;
use super::error::XyError;

/// Result of a single timed read from the byte channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A byte arrived before the timeout elapsed.
    Byte(u8),
    /// No byte arrived before the timeout elapsed.
    Timeout,
}

/// The byte channel and host-notification surface the session controller is
/// driven through.
///
/// Everything below the single-byte read/write is the host's concern: what
/// the underlying link actually is (serial, a BBS door's telnet socket, a
/// loopback test harness), buffering, and any flow control beyond what the
/// link itself provides. The engine only ever asks for one byte with a
/// timeout, or to send a handful of bytes.
pub trait IoPort {
    /// Block for up to `timeout` waiting for one byte.
    ///
    /// Returns `Err(XyError::Cancelled)` if the host observes the operator
    /// cancelling the transfer while waiting; any other I/O failure should
    /// be reported the same way.
    fn read(&mut self, timeout: Duration) -> Result<ReadOutcome, XyError>;

    /// Write one byte to the channel.
    fn write(&mut self, byte: u8) -> Result<(), XyError>;

    /// Write several bytes in order. The default implementation calls
    /// [`write`](Self::write) once per byte; a real transport can override
    /// this to coalesce them into a single underlying write.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), XyError> {
        for &b in bytes {
            self.write(b)?;
        }
        Ok(())
    }

    /// A human-readable progress/diagnostic line (dialect detected, NAK
    /// sent, retry count, abort reason). Purely informational.
    fn log(&mut self, message: &str);

    /// Bytes written to the current file so far, and its declared length
    /// (0 when unknown, as with plain XMODEM).
    fn progress(&mut self, bytes_written: u64, declared_total: u64);

    /// A file has been finalized (closed, mtime applied) and is ready for
    /// the host to act on.
    fn received(&mut self, download: Download);
}
