//! End-to-end receive scenarios driven entirely through the public API: a
//! scripted [`IoPort`] standing in for a serial link, and an in-memory
//! [`FileSinkFactory`] standing in for the filesystem.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::rc::Rc;
use std::time::Duration;

use xyrecv_core::core::protocol::xymodem::{
    checksum8, crc16_xmodem, Download, FileSink, FileSinkFactory, IoPort, OverrunPolicy,
    ReadOutcome, Session, XyError,
};

const SOH: u8 = 0x01;
const STX: u8 = 0x02;
const EOT: u8 = 0x04;
const ACK: u8 = 0x06;
const NAK: u8 = 0x15;
const CAN: u8 = 0x18;
const CRC_PROBE: u8 = b'C';
#[allow(dead_code)]
const STREAMING_PROBE: u8 = b'G';
const SHORT_BLOCK_LEN: usize = 128;
const LONG_BLOCK_LEN: usize = 1024;

#[derive(Debug, Clone, Copy)]
enum Event {
    Byte(u8),
    Timeout,
}

struct ScriptedPort {
    script: VecDeque<Event>,
    written: Vec<u8>,
    received: Vec<Download>,
}

impl ScriptedPort {
    fn new(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            script: events.into_iter().collect(),
            written: Vec::new(),
            received: Vec::new(),
        }
    }
}

impl IoPort for ScriptedPort {
    fn read(&mut self, _timeout: Duration) -> Result<ReadOutcome, XyError> {
        match self.script.pop_front() {
            Some(Event::Byte(b)) => Ok(ReadOutcome::Byte(b)),
            Some(Event::Timeout) | None => Ok(ReadOutcome::Timeout),
        }
    }

    fn write(&mut self, byte: u8) -> Result<(), XyError> {
        self.written.push(byte);
        Ok(())
    }

    fn log(&mut self, _message: &str) {}

    fn progress(&mut self, _bytes_written: u64, _declared_total: u64) {}

    fn received(&mut self, download: Download) {
        self.received.push(download);
    }
}

#[derive(Default, Clone)]
struct MemSinks {
    files: Rc<RefCell<HashMap<String, Vec<u8>>>>,
    deleted: Rc<RefCell<Vec<String>>>,
}

struct MemSink {
    name: String,
    buf: Vec<u8>,
    files: Rc<RefCell<HashMap<String, Vec<u8>>>>,
    deleted: Rc<RefCell<Vec<String>>>,
}

impl FileSinkFactory for MemSinks {
    fn create(&mut self, name: &str) -> io::Result<Box<dyn FileSink>> {
        Ok(Box::new(MemSink {
            name: name.to_string(),
            buf: Vec::new(),
            files: self.files.clone(),
            deleted: self.deleted.clone(),
        }))
    }
}

impl FileSink for MemSink {
    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.buf.extend_from_slice(data);
        Ok(())
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.buf.truncate(len as usize);
        Ok(())
    }

    fn set_mtime(&mut self, _mtime_secs: u64) -> io::Result<()> {
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.files.borrow_mut().insert(self.name.clone(), self.buf.clone());
        Ok(())
    }

    fn delete(self: Box<Self>) -> io::Result<()> {
        self.deleted.borrow_mut().push(self.name.clone());
        Ok(())
    }
}

fn framed(block_num: u8, payload: &[u8], use_crc: bool) -> Vec<Event> {
    let mut out = vec![if payload.len() == LONG_BLOCK_LEN { STX } else { SOH }];
    out.push(block_num);
    out.push(255u8.wrapping_sub(block_num));
    out.extend_from_slice(payload);
    if use_crc {
        let crc = crc16_xmodem(payload);
        out.push((crc >> 8) as u8);
        out.push((crc & 0xFF) as u8);
    } else {
        out.push(checksum8(payload));
    }
    out.into_iter().map(Event::Byte).collect()
}

fn pad_to(data: &[u8], len: usize) -> Vec<u8> {
    let mut v = data.to_vec();
    v.resize(len, 0);
    v
}

/// S1 — plain XMODEM, checksum dialect, single short block.
#[test]
fn plain_xmodem_checksum_single_file() {
    let payload = vec![b'A'; SHORT_BLOCK_LEN];
    // No 'C'/'G' reply to the probes at all: sender answers every probe
    // with NAK-dialect block 1 directly, so the handshake ladder bottoms
    // out at the plain NAK probe before the block arrives.
    let mut script = vec![Event::Timeout; 3]; // 'G' probes go unanswered
    script.extend(vec![Event::Timeout; 3]); // 'C' probes go unanswered
    script.extend(framed(1, &payload, false));
    script.push(Event::Byte(EOT));
    script.push(Event::Byte(EOT));

    let mut port = ScriptedPort::new(script);
    let mut sinks = MemSinks::default();
    let session = Session::new(OverrunPolicy::Ignore);
    let downloads = session.receive_all(&mut port, &mut sinks).unwrap();

    assert_eq!(downloads.len(), 1);
    assert_eq!(downloads[0].bytes_written, SHORT_BLOCK_LEN as u64);
    assert!(port.written.contains(&NAK));
    assert_eq!(sinks.files.borrow().get("received.bin").unwrap().len(), SHORT_BLOCK_LEN);
}

/// S2 — XMODEM-CRC, a single 1K block.
#[test]
fn xmodem_crc_1k_block() {
    let payload = vec![0xAAu8; LONG_BLOCK_LEN];
    // 'G' probes go unanswered so the ladder falls through to 'C'.
    let mut script = vec![Event::Timeout; 3];
    script.extend(framed(1, &payload, true));
    script.push(Event::Byte(EOT));
    script.push(Event::Byte(EOT));

    let mut port = ScriptedPort::new(script);
    let mut sinks = MemSinks::default();
    let session = Session::new(OverrunPolicy::Ignore);
    let downloads = session.receive_all(&mut port, &mut sinks).unwrap();

    assert_eq!(downloads.len(), 1);
    assert_eq!(downloads[0].bytes_written, LONG_BLOCK_LEN as u64);
    assert!(port.written.contains(&CRC_PROBE));
}

/// S3 — YMODEM batch of two files, exact lengths reported in block 0.
#[test]
fn ymodem_batch_two_files() {
    let data1 = vec![0x11u8; LONG_BLOCK_LEN];
    let data2 = pad_to(&vec![0x22u8; 50], LONG_BLOCK_LEN);

    // 'G' probes go unanswered so the ladder settles on CRC batch mode,
    // not streaming.
    let mut script = vec![Event::Timeout; 3];
    script.extend(framed(0, &pad_to(b"alpha.bin\x001024\0", LONG_BLOCK_LEN), true));
    script.extend(framed(1, &data1, true));
    script.push(Event::Byte(EOT));
    script.push(Event::Byte(EOT));
    script.extend(framed(0, &pad_to(b"beta.bin\x0050\0", LONG_BLOCK_LEN), true));
    script.extend(framed(1, &data2, true));
    script.push(Event::Byte(EOT));
    script.push(Event::Byte(EOT));
    script.extend(framed(0, &[0u8; LONG_BLOCK_LEN], true));

    let mut port = ScriptedPort::new(script);
    let mut sinks = MemSinks::default();
    let session = Session::new(OverrunPolicy::Ignore);
    let downloads = session.receive_all(&mut port, &mut sinks).unwrap();

    assert_eq!(downloads.len(), 2);
    assert_eq!(downloads[0].name.as_deref(), Some("alpha.bin"));
    assert_eq!(downloads[0].declared_length, 1024);
    assert_eq!(downloads[1].name.as_deref(), Some("beta.bin"));
    // overrun policy truncates the padded final packet back to the
    // declared 50 bytes.
    assert_eq!(sinks.files.borrow().get("beta.bin").unwrap().len(), 50);
}

/// S4 — the sender cancels mid-transfer with a pair of CAN bytes; the
/// partially written file must be deleted and the error surfaced.
#[test]
fn sender_cancel_deletes_partial_file() {
    let payload = vec![0x33u8; LONG_BLOCK_LEN];
    let mut script = vec![Event::Timeout; 3];
    script.extend(framed(1, &payload, true));
    script.push(Event::Byte(CAN));
    script.push(Event::Byte(CAN));

    let mut port = ScriptedPort::new(script);
    let mut sinks = MemSinks::default();
    let session = Session::new(OverrunPolicy::Ignore);
    let err = session.receive_all(&mut port, &mut sinks).unwrap_err();

    assert!(matches!(err, XyError::SenderCancelled));
    assert_eq!(sinks.deleted.borrow().len(), 1);
    assert!(sinks.files.borrow().is_empty());
}

/// S5 — YMODEM-G: no per-block ACK, and a mid-stream framing error is
/// immediately fatal rather than retried.
#[test]
fn ymodem_g_streaming_error_is_fatal() {
    let payload = vec![0x44u8; LONG_BLOCK_LEN];
    let b0 = pad_to(b"stream.bin\x002048\0", LONG_BLOCK_LEN);

    // The sender answers the very first streaming probe with block 0
    // directly, so the 'G' ladder rung is accepted on its first try.
    let mut script = framed(0, &b0, true);
    script.extend(framed(1, &payload, true));
    let mut bad = framed(2, &payload, true);
    if let Some(Event::Byte(b)) = bad.last_mut() {
        *b ^= 0xFF;
    }
    script.extend(bad);

    let mut port = ScriptedPort::new(script);
    let mut sinks = MemSinks::default();
    let session = Session::new(OverrunPolicy::Ignore);
    let err = session.receive_all(&mut port, &mut sinks).unwrap_err();

    assert!(matches!(err, XyError::Framing(_)));
    // no ACK bytes at all: a streaming transfer never acknowledges blocks.
    assert!(!port.written.contains(&ACK));
}

/// S6 — the declared length (50 bytes) is shorter than the single 128-byte
/// block that carries it, all within one packet: `Accept` keeps the padding,
/// `Ignore` truncates back to the declared length.
#[test]
fn overrun_accept_keeps_padding_ignore_truncates() {
    let payload = pad_to(&vec![0x55u8; 50], SHORT_BLOCK_LEN);
    let b0 = pad_to(b"small.bin\x0050\0", LONG_BLOCK_LEN);

    let build_script = || {
        let mut script = vec![Event::Timeout; 3];
        script.extend(framed(0, &b0, true));
        script.extend(framed(1, &payload, true));
        script.push(Event::Byte(EOT));
        script.push(Event::Byte(EOT));
        script.extend(framed(0, &[0u8; LONG_BLOCK_LEN], true));
        script
    };

    let mut port = ScriptedPort::new(build_script());
    let mut sinks = MemSinks::default();
    let session = Session::new(OverrunPolicy::Accept);
    let downloads = session.receive_all(&mut port, &mut sinks).unwrap();
    assert_eq!(downloads[0].bytes_written, SHORT_BLOCK_LEN as u64);
    assert_eq!(sinks.files.borrow().get("small.bin").unwrap().len(), SHORT_BLOCK_LEN);

    let mut port = ScriptedPort::new(build_script());
    let mut sinks = MemSinks::default();
    let session = Session::new(OverrunPolicy::Ignore);
    let downloads = session.receive_all(&mut port, &mut sinks).unwrap();
    assert_eq!(downloads[0].bytes_written, 50);
    assert_eq!(sinks.files.borrow().get("small.bin").unwrap().len(), 50);
}
