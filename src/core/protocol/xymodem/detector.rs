use std::collections::HashSet;

use super::io::IoPort;

/// The five dialects this engine can end up talking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolKind {
    /// Classic XMODEM, 128-byte blocks, 8-bit checksum.
    XModemChecksum,
    /// XMODEM-CRC, 128-byte blocks, CRC-16.
    XModemCrc,
    /// XMODEM-1K, 1024-byte blocks, CRC-16.
    XModem1K,
    /// YMODEM batch: block 0 metadata header, then XMODEM-1K-style data.
    YModemBatch,
    /// YMODEM-G: batch with no per-block ACK; any error is fatal.
    YModemG,
}

impl std::fmt::Display for ProtocolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::XModemChecksum => "XModem-Checksum",
            Self::XModemCrc => "XModem-CRC",
            Self::XModem1K => "XModem-1K",
            Self::YModemBatch => "YModem-Batch",
            Self::YModemG => "YModem-G",
        };
        f.write_str(name)
    }
}

/// Narrows a live candidate set of [`ProtocolKind`]s down to one as the
/// handshake and early blocks of a transfer reveal more about the sender.
///
/// Narrowing is monotonic: candidates are only ever removed, never added
/// back, across the whole session (it is not reset between files in a
/// batch). The first call that narrows the set to exactly one candidate
/// emits a single log line through the supplied [`IoPort`]; later calls
/// that keep the set at one candidate do nothing further.
pub struct ProtocolDetector {
    candidates: HashSet<ProtocolKind>,
    announced: bool,
    is_crc: bool,
    is_batch: bool,
    is_streaming: bool,
}

impl Default for ProtocolDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolDetector {
    /// Start with all five dialects still in play.
    pub fn new() -> Self {
        let candidates = [
            ProtocolKind::XModemChecksum,
            ProtocolKind::XModemCrc,
            ProtocolKind::XModem1K,
            ProtocolKind::YModemBatch,
            ProtocolKind::YModemG,
        ]
        .into_iter()
        .collect();
        Self {
            candidates,
            announced: false,
            is_crc: false,
            is_batch: false,
            is_streaming: false,
        }
    }

    fn remove_all(&mut self, kinds: &[ProtocolKind]) {
        for k in kinds {
            self.candidates.remove(k);
        }
    }

    fn maybe_announce(&mut self, port: &mut dyn IoPort) {
        if !self.announced {
            if let Some(kind) = self.detected() {
                port.log(&format!("Detected protocol: {kind}"));
                self.announced = true;
            }
        }
    }

    /// The handshake (or block 1's header size) established whether the
    /// sender is using CRC-16 rather than the 8-bit checksum.
    pub fn set_crc(&mut self, crc: bool, port: &mut dyn IoPort) {
        use ProtocolKind::*;
        if crc {
            self.is_crc = true;
            self.remove_all(&[XModemChecksum]);
        } else {
            self.remove_all(&[XModemCrc, XModem1K, YModemBatch, YModemG]);
        }
        self.maybe_announce(port);
    }

    /// The handshake established whether the sender is streaming
    /// (YMODEM-G, no per-block ACK).
    pub fn set_streaming(&mut self, streaming: bool, port: &mut dyn IoPort) {
        use ProtocolKind::*;
        if streaming {
            self.is_streaming = true;
            self.is_crc = true;
            self.remove_all(&[XModemChecksum, XModemCrc, XModem1K, YModemBatch]);
        } else {
            self.remove_all(&[YModemG]);
        }
        self.maybe_announce(port);
    }

    /// The first block's number (0 vs 1) established whether a block-0
    /// metadata header is in use at all.
    pub fn set_batch(&mut self, batch: bool, port: &mut dyn IoPort) {
        use ProtocolKind::*;
        if batch {
            self.is_batch = true;
            self.remove_all(&[XModemChecksum, XModemCrc, XModem1K]);
        } else {
            self.remove_all(&[YModemBatch, YModemG]);
        }
        self.maybe_announce(port);
    }

    /// The first data block's header byte (SOH vs STX) established the
    /// block length.
    pub fn set_1k(&mut self, one_k: bool, port: &mut dyn IoPort) {
        use ProtocolKind::*;
        if one_k {
            self.remove_all(&[XModemChecksum, XModemCrc]);
        } else {
            self.remove_all(&[XModem1K, YModemBatch, YModemG]);
        }
        self.maybe_announce(port);
    }

    /// `true` once CRC-16 framing has been established.
    pub fn is_crc(&self) -> bool {
        self.is_crc
    }

    /// `true` once a block-0 metadata header has been observed.
    pub fn is_batch(&self) -> bool {
        self.is_batch
    }

    /// `true` once YMODEM-G streaming has been established.
    pub fn is_streaming(&self) -> bool {
        self.is_streaming
    }

    /// The single remaining candidate, once the set has narrowed to one.
    pub fn detected(&self) -> Option<ProtocolKind> {
        if self.candidates.len() == 1 {
            self.candidates.iter().next().copied()
        } else {
            None
        }
    }
}
