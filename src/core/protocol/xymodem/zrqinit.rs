//! Recognizes a ZMODEM `ZRQINIT` request frame in an otherwise unclassified
//! byte stream, so a host can decline it before ever entering an XMODEM/
//! YMODEM [`Session`](super::Session).
//!
//! This is the full extent of ZMODEM support this crate carries: detection,
//! not participation.

/// `**\x18B0000000000000000\r\n\x11` — the literal 21-byte ZRQINIT header a
/// `sz`-family sender opens with.
const ZRQINIT: [u8; 21] = [
    b'*', b'*', 0x18, b'B', b'0', b'0', b'0', b'0', b'0', b'0', b'0', b'0', b'0', b'0', b'0',
    b'0', b'0', b'0', 0x0D, 0x0A, 0x11,
];

/// A byte-at-a-time matcher for the ZRQINIT sequence.
///
/// Matching is a strict prefix match from zero: a mismatching byte resets
/// the index to 0 unconditionally, with no KMP-style partial backtracking.
#[derive(Debug, Default)]
pub struct ZrqinitDetector {
    index: usize,
}

impl ZrqinitDetector {
    /// Create a fresh detector.
    pub fn new() -> Self {
        Self { index: 0 }
    }

    /// Feed one byte. Returns `true` on (and only on) the byte that
    /// completes the sequence, at which point the detector resets itself
    /// and is ready to detect another ZRQINIT.
    pub fn feed(&mut self, byte: u8) -> bool {
        if byte == ZRQINIT[self.index] {
            self.index += 1;
            if self.index == ZRQINIT.len() {
                self.index = 0;
                return true;
            }
        } else {
            self.index = 0;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_full_sequence() {
        let mut d = ZrqinitDetector::new();
        let mut hit = false;
        for &b in ZRQINIT.iter() {
            hit = d.feed(b);
        }
        assert!(hit);
    }

    #[test]
    fn single_substitution_never_matches() {
        let mut corrupted = ZRQINIT;
        corrupted[10] = b'9';
        let mut d = ZrqinitDetector::new();
        let mut hit = false;
        for &b in corrupted.iter() {
            hit |= d.feed(b);
        }
        assert!(!hit);
    }

    #[test]
    fn detector_resets_after_match_for_reuse() {
        let mut d = ZrqinitDetector::new();
        for &b in ZRQINIT.iter() {
            d.feed(b);
        }
        let mut hit = false;
        for &b in ZRQINIT.iter() {
            hit = d.feed(b);
        }
        assert!(hit);
    }

    #[test]
    fn unrelated_bytes_never_match() {
        let mut d = ZrqinitDetector::new();
        let mut hit = false;
        for _ in 0..64 {
            hit |= d.feed(0x41);
        }
        assert!(!hit);
    }
}
