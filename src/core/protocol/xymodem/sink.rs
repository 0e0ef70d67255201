use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// The filesystem surface a finalized file is written through.
///
/// This is a separate concern from [`IoPort`](super::io::IoPort): the byte
/// channel and the output sink are independent externalities a host wires
/// up on its own terms.
pub trait FileSink {
    /// Append `data` to the sink.
    fn write(&mut self, data: &[u8]) -> io::Result<()>;
    /// Truncate the sink to exactly `len` bytes, discarding anything
    /// written past that point.
    fn truncate(&mut self, len: u64) -> io::Result<()>;
    /// Apply a seconds-since-epoch mtime to the underlying file.
    fn set_mtime(&mut self, mtime_secs: u64) -> io::Result<()>;
    /// Flush and close the sink. Called once, on successful completion.
    fn close(&mut self) -> io::Result<()>;
    /// Remove the underlying file. Called on any fatal abort that leaves
    /// a partially-written file behind.
    fn delete(self: Box<Self>) -> io::Result<()>;
}

/// Creates [`FileSink`]s rooted at a single output directory, and tracks
/// which names have already been materialized there so block-0 name
/// collisions can be resolved.
pub trait FileSinkFactory {
    /// Open (creating if necessary) a sink for `name`, which the factory
    /// may itself have deduplicated against names already used this
    /// session or already present on disk.
    fn create(&mut self, name: &str) -> io::Result<Box<dyn FileSink>>;
}

/// A [`FileSink`] backed by a plain file on disk.
pub struct StdFileSink {
    path: PathBuf,
    file: File,
}

impl StdFileSink {
    fn open(path: PathBuf) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        Ok(Self { path, file })
    }
}

impl FileSink for StdFileSink {
    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.file.set_len(len)
    }

    fn set_mtime(&mut self, mtime_secs: u64) -> io::Result<()> {
        self.file.flush()?;
        let mtime = filetime::FileTime::from_unix_time(mtime_secs as i64, 0);
        filetime::set_file_mtime(&self.path, mtime)
    }

    fn close(&mut self) -> io::Result<()> {
        self.file.flush()
    }

    fn delete(self: Box<Self>) -> io::Result<()> {
        fs::remove_file(&self.path)
    }
}

/// The obvious [`FileSinkFactory`]: files land directly in one directory,
/// with [`block0::dedupe_name`](super::block0::dedupe_name) resolving
/// collisions against names already seen this session or already present
/// on disk.
pub struct StdFileSinkFactory {
    dir: PathBuf,
    used: std::collections::HashSet<String>,
}

impl StdFileSinkFactory {
    /// Write received files into `dir`, creating it if it doesn't exist.
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let used = fs::read_dir(&dir)?
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().into_string().ok())
            .collect();
        Ok(Self { dir, used })
    }

    /// The deduplicated name this factory would assign to `name`, without
    /// creating anything.
    pub fn resolve_name(&self, name: &str) -> String {
        super::block0::dedupe_name(name, &self.used)
    }
}

impl FileSinkFactory for StdFileSinkFactory {
    fn create(&mut self, name: &str) -> io::Result<Box<dyn FileSink>> {
        let resolved = self.resolve_name(name);
        self.used.insert(resolved.clone());
        let path = Path::new(&self.dir).join(&resolved);
        Ok(Box::new(StdFileSink::open(path)?))
    }
}
