use std::collections::HashSet;

/// The parsed payload of a YMODEM block 0.
///
/// A block 0 with an empty (zero-length, or absent) name marks the end of
/// a batch, independent of anything else in the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block0 {
    /// No more files follow in this batch.
    EndOfBatch,
    /// A file is about to be sent, with whatever metadata the sender
    /// chose to include.
    File(Block0Metadata),
}

/// Metadata fields carried in a YMODEM block 0 payload:
/// `name\0length mtime mode serial\0`. Every numeric field after the name
/// is optional and whitespace-separated; an empty string in a slot, or the
/// field being entirely absent, both mean "not specified" and leave the
/// corresponding value at its default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block0Metadata {
    /// Just the file name portion (after the last `/`), not yet
    /// deduplicated against anything already on disk.
    pub name: String,
    /// Declared length in bytes, 0 if absent or unparsable.
    pub length: u64,
    /// Seconds-since-epoch, parsed as octal per the convention this field
    /// has always used. `None` if absent, zero, or unparsable.
    pub mtime: Option<u64>,
    /// Unix permission bits, parsed as octal. 0 if absent or unparsable.
    pub mode: u32,
    /// Sender-assigned serial/program number. 0 if absent or unparsable.
    pub serial: u32,

    /// `true` if a length field was present but failed to parse as
    /// decimal. Does not affect `length`, which stays 0 in that case.
    pub length_parse_failed: bool,
    /// `true` if an mtime field was present, non-zero, but failed to parse
    /// as octal.
    pub mtime_parse_failed: bool,
    /// `true` if a mode field was present but failed to parse as octal.
    pub mode_parse_failed: bool,
    /// `true` if a serial field was present but failed to parse as
    /// octal.
    pub serial_parse_failed: bool,
}

fn normalize_name(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    match text.rfind('/') {
        Some(idx) => text[idx + 1..].to_string(),
        None => text.into_owned(),
    }
}

fn parse_decimal_u64(token: &[u8]) -> Option<u64> {
    std::str::from_utf8(token).ok()?.parse().ok()
}

fn parse_octal_u32(token: &[u8]) -> Option<u32> {
    u32::from_str_radix(std::str::from_utf8(token).ok()?, 8).ok()
}

fn parse_octal_u64(token: &[u8]) -> Option<u64> {
    u64::from_str_radix(std::str::from_utf8(token).ok()?, 8).ok()
}

/// Parse a block 0 payload.
pub fn parse(payload: &[u8]) -> Block0 {
    let name_end = payload.iter().position(|&b| b == 0).unwrap_or(payload.len());
    if name_end == 0 {
        return Block0::EndOfBatch;
    }
    let name = normalize_name(&payload[..name_end]);

    let mut meta = Block0Metadata {
        name,
        length: 0,
        mtime: None,
        mode: 0,
        serial: 0,
        length_parse_failed: false,
        mtime_parse_failed: false,
        mode_parse_failed: false,
        serial_parse_failed: false,
    };

    if name_end < payload.len() {
        let rest_start = name_end + 1;
        let rest_end = payload[rest_start..]
            .iter()
            .position(|&b| b == 0)
            .map(|p| rest_start + p)
            .unwrap_or(payload.len());
        let rest = &payload[rest_start..rest_end];
        let tokens: Vec<&[u8]> = rest.split(|&b| b == b' ').collect();

        if let Some(tok) = tokens.first() {
            if !tok.is_empty() {
                match parse_decimal_u64(tok) {
                    Some(v) => meta.length = v,
                    None => meta.length_parse_failed = true,
                }
            }
        }
        if let Some(tok) = tokens.get(1) {
            if !tok.is_empty() {
                match parse_octal_u64(tok) {
                    Some(0) => {}
                    Some(v) => meta.mtime = Some(v),
                    None => meta.mtime_parse_failed = true,
                }
            }
        }
        if let Some(tok) = tokens.get(2) {
            if !tok.is_empty() {
                match parse_octal_u32(tok) {
                    Some(v) => meta.mode = v,
                    None => meta.mode_parse_failed = true,
                }
            }
        }
        if let Some(tok) = tokens.get(3) {
            if !tok.is_empty() {
                match parse_octal_u32(tok) {
                    Some(v) => meta.serial = v,
                    None => meta.serial_parse_failed = true,
                }
            }
        }
    }

    Block0::File(meta)
}

/// Resolve a collision between `name` and anything already materialized in
/// `existing` by appending `-<n>` before the extension, trying `n = 1, 2,
/// ...` until the result is unused. The extension is whatever follows the
/// last `.`, unless that `.` is the first character of the name (a dotfile
/// has no extension for this purpose).
pub fn dedupe_name(name: &str, existing: &HashSet<String>) -> String {
    if !existing.contains(name) {
        return name.to_string();
    }

    let (stem, ext) = match name.rfind('.') {
        Some(0) | None => (name, ""),
        Some(idx) => (&name[..idx], &name[idx..]),
    };

    let mut n = 1u64;
    loop {
        let candidate = format!("{stem}-{n}{ext}");
        if !existing.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
