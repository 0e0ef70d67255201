//! An in-memory [`IoPort`] for exercising the engine without a real byte
//! channel: a fixed script of bytes (or simulated timeouts) to read back,
//! and recorders for everything written, logged, or reported.

use std::collections::VecDeque;
use std::time::Duration;

use super::download::Download;
use super::error::XyError;
use super::io::{IoPort, ReadOutcome};

/// One entry in a [`ScriptedPort`]'s input script.
#[derive(Debug, Clone, Copy)]
pub enum ScriptEvent {
    /// The next `read` call returns this byte.
    Byte(u8),
    /// The next `read` call times out instead of returning a byte.
    Timeout,
    /// The next `read` call reports a user cancellation.
    Cancel,
}

impl From<u8> for ScriptEvent {
    fn from(b: u8) -> Self {
        ScriptEvent::Byte(b)
    }
}

/// A scripted, recording [`IoPort`] for tests.
pub struct ScriptedPort {
    script: VecDeque<ScriptEvent>,
    written: Vec<u8>,
    logs: Vec<String>,
    progress_calls: Vec<(u64, u64)>,
    received: Vec<Download>,
}

impl ScriptedPort {
    /// Build a port that will hand back `script`, in order, one event per
    /// `read` call. Once exhausted, every further read times out (silence
    /// forever, the natural end state of a scripted conversation).
    pub fn new(script: Vec<ScriptEvent>) -> Self {
        Self {
            script: script.into(),
            written: Vec::new(),
            logs: Vec::new(),
            progress_calls: Vec::new(),
            received: Vec::new(),
        }
    }

    /// Everything written to the port, in order.
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// All logged lines, in order.
    pub fn log_lines(&self) -> &[String] {
        &self.logs
    }

    /// Whether any logged line contains `needle`.
    pub fn logged_any(&self, needle: &str) -> bool {
        self.logs.iter().any(|l| l.contains(needle))
    }

    /// All `(bytes_written, declared_total)` progress reports, in order.
    pub fn progress_calls(&self) -> &[(u64, u64)] {
        &self.progress_calls
    }

    /// Every file this port was handed via [`IoPort::received`], in order.
    pub fn received_files(&self) -> &[Download] {
        &self.received
    }
}

impl IoPort for ScriptedPort {
    fn read(&mut self, _timeout: Duration) -> Result<ReadOutcome, XyError> {
        match self.script.pop_front() {
            Some(ScriptEvent::Byte(b)) => Ok(ReadOutcome::Byte(b)),
            Some(ScriptEvent::Timeout) | None => Ok(ReadOutcome::Timeout),
            Some(ScriptEvent::Cancel) => Err(XyError::Cancelled),
        }
    }

    fn write(&mut self, byte: u8) -> Result<(), XyError> {
        self.written.push(byte);
        Ok(())
    }

    fn log(&mut self, message: &str) {
        self.logs.push(message.to_string());
    }

    fn progress(&mut self, bytes_written: u64, declared_total: u64) {
        self.progress_calls.push((bytes_written, declared_total));
    }

    fn received(&mut self, download: Download) {
        self.received.push(download);
    }
}
