//! Wire-protocol byte constants shared by the framer and session controller.

pub const SOH: u8 = 0x01;
pub const STX: u8 = 0x02;
pub const EOT: u8 = 0x04;
pub const ACK: u8 = 0x06;
pub const NAK: u8 = 0x15;
pub const CAN: u8 = 0x18;
pub const BS: u8 = 0x08;
/// Some senders signal end-of-transfer with SUB/EOF (Ctrl-Z) instead of EOT.
pub const EOF: u8 = 0x1A;
pub const CRC_PROBE: u8 = b'C';
pub const STREAMING_PROBE: u8 = b'G';

pub const SHORT_BLOCK_LEN: usize = 128;
pub const LONG_BLOCK_LEN: usize = 1024;

pub const HEADER_TIMEOUT_MS: u64 = 10_000;
pub const INTRA_BLOCK_TIMEOUT_MS: u64 = 1_000;
pub const LADDER_PROBE_TIMEOUT_MS: u64 = 2_000;
pub const DRAIN_TIMEOUT_MS: u64 = 1_000;

pub const STREAMING_RETRIES: u32 = 3;
pub const CRC_RETRIES: u32 = 3;
pub const NAK_RETRIES: u32 = 4;
pub const MAX_BLOCK_RETRIES: u32 = 10;
