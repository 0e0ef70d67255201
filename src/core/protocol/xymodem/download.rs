/// One finalized, received file, surfaced to the host via
/// [`IoPort::received`](super::io::IoPort::received) once it has been
/// closed and had its mtime applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// The deduplicated file name, or `None` for a bare (non-batch) XMODEM
    /// transfer, which never carries a name.
    pub name: Option<String>,
    /// The length the sender declared in block 0, or 0 if unknown/absent.
    pub declared_length: u64,
    /// The number of bytes actually written to the sink, after any
    /// overrun truncation.
    pub bytes_written: u64,
    /// Seconds-since-epoch mtime applied to the file, if any was declared.
    pub mtime: Option<u64>,
    /// Unix file mode declared in block 0, or 0 if absent/unparsable.
    pub mode: u32,
    /// The serial/program field declared in block 0, or 0 if absent.
    pub serial: u32,
}
