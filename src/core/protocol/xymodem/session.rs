use std::time::Duration;

use super::block0::{self, Block0};
use super::consts::*;
use super::detector::ProtocolDetector;
use super::download::Download;
use super::error::XyError;
use super::framer::{self, BlockOutcome};
use super::io::{IoPort, ReadOutcome};
use super::sink::{FileSink, FileSinkFactory};

/// The on-disk name given to a plain (non-batch) XMODEM transfer, which
/// never carries a sender-supplied name. The surfaced [`Download::name`]
/// stays `None` regardless — this is only what the sink is opened with,
/// and the factory's own collision handling disambiguates repeat receives.
const SYNTHETIC_NAME: &str = "received.bin";

/// What to do when a file's data runs past its declared length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum OverrunPolicy {
    /// Truncate the sink back to the declared length and say nothing.
    #[default]
    Ignore,
    /// Fail the transfer.
    Error,
    /// Keep every byte received, padding and all.
    Accept,
    /// Truncate and keep the file only when the overrun was confined to
    /// the packet that crossed the boundary; fail if a whole extra packet
    /// followed.
    Mixed,
}

/// A one-byte-deep pushback buffer in front of a real [`IoPort`], so the
/// handshake can stash a byte the sender sent as its first data-block
/// header rather than as a handshake ack, and have the framer see it on
/// its very first read.
struct Pushback<'a> {
    inner: &'a mut dyn IoPort,
    stashed: Option<u8>,
}

impl IoPort for Pushback<'_> {
    fn read(&mut self, timeout: Duration) -> Result<ReadOutcome, XyError> {
        if let Some(b) = self.stashed.take() {
            return Ok(ReadOutcome::Byte(b));
        }
        self.inner.read(timeout)
    }

    fn write(&mut self, byte: u8) -> Result<(), XyError> {
        self.inner.write(byte)
    }

    fn log(&mut self, message: &str) {
        self.inner.log(message);
    }

    fn progress(&mut self, bytes_written: u64, declared_total: u64) {
        self.inner.progress(bytes_written, declared_total);
    }

    fn received(&mut self, download: Download) {
        self.inner.received(download);
    }
}

struct ActiveFile {
    sink: Box<dyn FileSink>,
    name: Option<String>,
    declared_length: u64,
    bytes_written: u64,
    possible_last_packet: bool,
    mtime: Option<u64>,
    mode: u32,
    serial: u32,
}

/// The result of receiving one file in a (possibly batch) transfer.
enum FileOutcome {
    Done(Download),
    BatchEnded,
}

/// Drives one XMODEM/YMODEM receive: the handshake ladder, the per-file
/// transfer loop, and the graceful abort sequence, against an [`IoPort`]
/// and a [`FileSinkFactory`] supplied by the host.
///
/// A `Session` is single-threaded and fully synchronous; it blocks on
/// `IoPort::read` the way the protocol itself is inherently
/// request/response. Any concurrency (multiple ports, a UI thread) is the
/// host's concern, not this engine's.
pub struct Session {
    detector: ProtocolDetector,
    handshake_byte: Option<u8>,
    overrun_policy: OverrunPolicy,
}

impl Session {
    /// Start a new session with the given overrun policy.
    pub fn new(overrun_policy: OverrunPolicy) -> Self {
        Self {
            detector: ProtocolDetector::new(),
            handshake_byte: None,
            overrun_policy,
        }
    }

    /// Receive every file the sender offers, in order, returning once the
    /// sender signals end-of-batch (or, for a bare non-batch transfer,
    /// after the single file completes).
    ///
    /// On any fatal error the session has already run the graceful abort
    /// sequence and deleted any partially-written file before returning.
    pub fn receive_all(
        mut self,
        port: &mut dyn IoPort,
        sinks: &mut dyn FileSinkFactory,
    ) -> Result<Vec<Download>, XyError> {
        let mut downloads = Vec::new();
        loop {
            let pushback = self.handshake(port)?;
            match self.receive_one_file(port, sinks, pushback) {
                Ok(FileOutcome::Done(dl)) => {
                    downloads.push(dl);
                    if !self.detector.is_batch() {
                        return Ok(downloads);
                    }
                }
                Ok(FileOutcome::BatchEnded) => return Ok(downloads),
                Err(e) => return Err(e),
            }
        }
    }

    fn drain(&self, port: &mut dyn IoPort, swallow_cancel: bool) {
        loop {
            match port.read(Duration::from_millis(DRAIN_TIMEOUT_MS)) {
                Ok(ReadOutcome::Timeout) => return,
                Ok(ReadOutcome::Byte(_)) => continue,
                Err(XyError::Cancelled) if swallow_cancel => continue,
                Err(_) => return,
            }
        }
    }

    fn send_nak(&self, port: &mut dyn IoPort) -> Result<(), XyError> {
        self.drain(port, false);
        port.write(NAK)
    }

    fn graceful_abort(&self, port: &mut dyn IoPort) {
        let streaming = self.detector.is_streaming();
        if streaming {
            let _ = port.write_bytes(&[CAN, CAN]);
        }
        self.drain(port, true);
        let can_count = if streaming { 6 } else { 8 };
        let _ = port.write_bytes(&vec![CAN; can_count]);
        let _ = port.write_bytes(&[BS; 8]);
    }

    /// Run the handshake ladder (§4.3), reusing a previously-established
    /// handshake byte for later files in a batch. Returns a one-byte
    /// pushback (the sender's first post-handshake byte, if one arrived
    /// alongside the ack) for the caller to feed back into the framer.
    fn handshake(&mut self, port: &mut dyn IoPort) -> Result<Option<u8>, XyError> {
        self.drain(port, false);

        if let Some(byte) = self.handshake_byte {
            for _ in 0..10 {
                port.write(byte)?;
                match port.read(Duration::from_millis(HEADER_TIMEOUT_MS))? {
                    ReadOutcome::Byte(b) => return Ok(Some(b)),
                    ReadOutcome::Timeout => continue,
                }
            }
            return Err(XyError::HandshakeTimedOut);
        }

        for _ in 0..STREAMING_RETRIES {
            port.write(STREAMING_PROBE)?;
            if let ReadOutcome::Byte(b) =
                port.read(Duration::from_millis(LADDER_PROBE_TIMEOUT_MS))?
            {
                self.detector.set_streaming(true, port);
                self.handshake_byte = Some(STREAMING_PROBE);
                return Ok(Some(b));
            }
        }

        for _ in 0..CRC_RETRIES {
            port.write(CRC_PROBE)?;
            if let ReadOutcome::Byte(b) =
                port.read(Duration::from_millis(LADDER_PROBE_TIMEOUT_MS))?
            {
                self.detector.set_crc(true, port);
                self.detector.set_streaming(false, port);
                self.handshake_byte = Some(CRC_PROBE);
                return Ok(Some(b));
            }
        }

        for _ in 0..NAK_RETRIES {
            port.write(NAK)?;
            if let ReadOutcome::Byte(b) =
                port.read(Duration::from_millis(LADDER_PROBE_TIMEOUT_MS))?
            {
                self.detector.set_crc(false, port);
                self.handshake_byte = Some(NAK);
                return Ok(Some(b));
            }
        }

        Err(XyError::HandshakeTimedOut)
    }

    fn write_block(&self, file: &mut ActiveFile, payload: &[u8], port: &mut dyn IoPort) -> Result<(), XyError> {
        if file.declared_length == 0 {
            file.sink.write(payload)?;
            file.bytes_written += payload.len() as u64;
            file.possible_last_packet = false;
        } else {
            let before = file.bytes_written;
            let after = before + payload.len() as u64;
            file.possible_last_packet = before < file.declared_length && after >= file.declared_length;
            file.sink.write(payload)?;
            file.bytes_written = after;
        }
        port.progress(file.bytes_written, file.declared_length);
        Ok(())
    }

    fn finalize(
        &self,
        mut file: ActiveFile,
        port: &mut dyn IoPort,
    ) -> Result<Download, XyError> {
        if file.declared_length > 0 && file.bytes_written > file.declared_length {
            let whole_extra_packet_followed = !file.possible_last_packet;
            match self.overrun_policy {
                OverrunPolicy::Accept => {
                    port.log("file exceeded its declared length; keeping all received data");
                }
                OverrunPolicy::Error if whole_extra_packet_followed => {
                    return Err(XyError::Overrun);
                }
                OverrunPolicy::Error => {
                    file.sink.truncate(file.declared_length)?;
                }
                OverrunPolicy::Ignore => {
                    file.sink.truncate(file.declared_length)?;
                }
                OverrunPolicy::Mixed if whole_extra_packet_followed => {
                    return Err(XyError::Overrun);
                }
                OverrunPolicy::Mixed => {
                    file.sink.truncate(file.declared_length)?;
                }
            }
            if !matches!(self.overrun_policy, OverrunPolicy::Accept) {
                file.bytes_written = file.declared_length;
            }
        } else if file.declared_length > 0 && file.bytes_written < file.declared_length {
            port.log("file ended short of its declared length; accepting as-is");
        }

        if let Some(mtime) = file.mtime {
            file.sink.set_mtime(mtime)?;
        }
        file.sink.close()?;

        let download = Download {
            name: file.name,
            declared_length: file.declared_length,
            bytes_written: file.bytes_written,
            mtime: file.mtime,
            mode: file.mode,
            serial: file.serial,
        };
        port.write(ACK)?;
        port.received(download.clone());
        Ok(download)
    }

    fn receive_one_file(
        &mut self,
        port: &mut dyn IoPort,
        sinks: &mut dyn FileSinkFactory,
        first_byte: Option<u8>,
    ) -> Result<FileOutcome, XyError> {
        let mut pb = Pushback { inner: port, stashed: first_byte };

        let mut prev_block_num: Option<u8> = None;
        let mut active: Option<ActiveFile> = None;
        let mut retries = 0u32;

        loop {
            match framer::read_block(&mut pb, self.detector.is_crc()) {
                Ok(BlockOutcome::Eot) => {
                    if self.detector.is_streaming() {
                        match active {
                            Some(file) => return self.finalize(file, &mut pb).map(FileOutcome::Done),
                            None => return Ok(FileOutcome::BatchEnded),
                        }
                    }
                    self.send_nak(&mut pb)?;
                    match framer::read_block(&mut pb, self.detector.is_crc()) {
                        Ok(BlockOutcome::Eot) => {
                            if active.is_none() {
                                pb.write(ACK)?;
                            }
                            return match active {
                                Some(file) => self.finalize(file, &mut pb).map(FileOutcome::Done),
                                None => Ok(FileOutcome::BatchEnded),
                            };
                        }
                        _ => {
                            self.graceful_abort(&mut pb);
                            if let Some(file) = active {
                                let _ = file.sink.delete();
                            }
                            return Err(XyError::Framing("EOT not repeated".into()));
                        }
                    }
                }
                Ok(BlockOutcome::Block { block_num, payload }) => {
                    retries = 0;
                    match prev_block_num {
                        None => match block_num {
                            0 => {
                                self.detector.set_batch(true, &mut pb);
                                match block0::parse(&payload) {
                                    Block0::EndOfBatch => {
                                        if !self.detector.is_streaming() {
                                            pb.write(ACK)?;
                                        }
                                        return Ok(FileOutcome::BatchEnded);
                                    }
                                    Block0::File(meta) => {
                                        let sink = sinks.create(&meta.name)?;
                                        pb.progress(0, meta.length);
                                        active = Some(ActiveFile {
                                            sink,
                                            name: Some(meta.name),
                                            declared_length: meta.length,
                                            bytes_written: 0,
                                            possible_last_packet: false,
                                            mtime: meta.mtime,
                                            mode: meta.mode,
                                            serial: meta.serial,
                                        });
                                        if !self.detector.is_streaming() {
                                            pb.write(ACK)?;
                                        }
                                        if let Some(byte) = self.handshake_byte {
                                            pb.write(byte)?;
                                        }
                                        prev_block_num = Some(0);
                                    }
                                }
                            }
                            1 => {
                                self.detector.set_batch(false, &mut pb);
                                self.detector.set_1k(payload.len() == LONG_BLOCK_LEN, &mut pb);
                                let mut file = ActiveFile {
                                    sink: sinks.create(SYNTHETIC_NAME)?,
                                    name: None,
                                    declared_length: 0,
                                    bytes_written: 0,
                                    possible_last_packet: false,
                                    mtime: None,
                                    mode: 0,
                                    serial: 0,
                                };
                                self.write_block(&mut file, &payload, &mut pb)?;
                                active = Some(file);
                                if !self.detector.is_streaming() {
                                    pb.write(ACK)?;
                                }
                                prev_block_num = Some(1);
                            }
                            _ => {
                                self.graceful_abort(&mut pb);
                                return Err(XyError::OutOfSequence);
                            }
                        },
                        Some(prev) => {
                            if block_num == prev {
                                if !self.detector.is_streaming() {
                                    pb.write(ACK)?;
                                }
                            } else if block_num == prev.wrapping_add(1) {
                                if let Some(file) = active.as_mut() {
                                    self.write_block(file, &payload, &mut pb)?;
                                }
                                if !self.detector.is_streaming() {
                                    pb.write(ACK)?;
                                }
                                prev_block_num = Some(block_num);
                            } else {
                                self.graceful_abort(&mut pb);
                                if let Some(file) = active {
                                    let _ = file.sink.delete();
                                }
                                return Err(XyError::OutOfSequence);
                            }
                        }
                    }
                }
                Err(XyError::SenderCancelled) => {
                    self.graceful_abort(&mut pb);
                    if let Some(file) = active {
                        let _ = file.sink.delete();
                    }
                    return Err(XyError::SenderCancelled);
                }
                Err(XyError::Cancelled) => {
                    self.graceful_abort(&mut pb);
                    if let Some(file) = active {
                        let _ = file.sink.delete();
                    }
                    return Err(XyError::Cancelled);
                }
                Err(e @ (XyError::Timeout | XyError::Framing(_))) => {
                    if self.detector.is_streaming() {
                        self.graceful_abort(&mut pb);
                        if let Some(file) = active {
                            let _ = file.sink.delete();
                        }
                        return Err(e);
                    }
                    retries += 1;
                    if retries > MAX_BLOCK_RETRIES {
                        self.graceful_abort(&mut pb);
                        if let Some(file) = active {
                            let _ = file.sink.delete();
                        }
                        return Err(XyError::TooManyErrors);
                    }
                    self.send_nak(&mut pb)?;
                }
                Err(e) => {
                    self.graceful_abort(&mut pb);
                    if let Some(file) = active {
                        let _ = file.sink.delete();
                    }
                    return Err(e);
                }
            }
        }
    }
}
