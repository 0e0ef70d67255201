use std::time::Duration;

use super::checksum::{checksum8, crc16_xmodem};
use super::consts::*;
use super::error::XyError;
use super::io::{IoPort, ReadOutcome};

/// One successfully framed unit from the byte channel.
#[derive(Debug)]
pub enum BlockOutcome {
    /// A data block, with its declared block number and payload (128 or
    /// 1024 bytes, still including any trailing padding the sender used).
    Block { block_num: u8, payload: Vec<u8> },
    /// The sender signaled end-of-transmission (EOT or EOF/Ctrl-Z).
    Eot,
}

fn read_timed(port: &mut dyn IoPort, timeout_ms: u64) -> Result<u8, XyError> {
    match port.read(Duration::from_millis(timeout_ms))? {
        ReadOutcome::Byte(b) => Ok(b),
        ReadOutcome::Timeout => Err(XyError::Timeout),
    }
}

/// Wait for, and frame, the next block or EOT from the sender.
///
/// Timeouts here follow the fixed schedule §5 of the design lays out: up to
/// [`HEADER_TIMEOUT_MS`] for the header byte (the inter-block wait), and
/// [`INTRA_BLOCK_TIMEOUT_MS`] for every byte after it.
pub fn read_block(port: &mut dyn IoPort, use_crc: bool) -> Result<BlockOutcome, XyError> {
    let header = read_timed(port, HEADER_TIMEOUT_MS)?;

    let len = match header {
        EOT | EOF => return Ok(BlockOutcome::Eot),
        CAN => {
            let next = read_timed(port, INTRA_BLOCK_TIMEOUT_MS)?;
            if next == CAN {
                return Err(XyError::SenderCancelled);
            }
            return Err(XyError::Framing("unexpected byte after CAN".into()));
        }
        SOH => SHORT_BLOCK_LEN,
        STX => LONG_BLOCK_LEN,
        other => {
            return Err(XyError::Framing(format!("bad header byte 0x{other:02X}")));
        }
    };

    let block_num = read_timed(port, INTRA_BLOCK_TIMEOUT_MS)?;
    let complement = read_timed(port, INTRA_BLOCK_TIMEOUT_MS)?;
    if block_num != 255u8.wrapping_sub(complement) {
        return Err(XyError::Framing("bad block-number complement".into()));
    }

    let mut payload = Vec::with_capacity(len);
    for _ in 0..len {
        payload.push(read_timed(port, INTRA_BLOCK_TIMEOUT_MS)?);
    }

    if use_crc {
        let hi = read_timed(port, INTRA_BLOCK_TIMEOUT_MS)?;
        let lo = read_timed(port, INTRA_BLOCK_TIMEOUT_MS)?;
        let received = (u16::from(hi) << 8) | u16::from(lo);
        if received != crc16_xmodem(&payload) {
            return Err(XyError::Framing("CRC mismatch".into()));
        }
    } else {
        let received = read_timed(port, INTRA_BLOCK_TIMEOUT_MS)?;
        if received != checksum8(&payload) {
            return Err(XyError::Framing("checksum mismatch".into()));
        }
    }

    Ok(BlockOutcome::Block { block_num, payload })
}
