//! Sink that writes every item to its own log file.
//!
//! Each [`FileSink`] instance, including every clone, opens a distinct file
//! `<prefix>_<uuid>.log` inside the configured directory, so workers never
//! interleave output in the same file.
//!
//! Record format, one per item:
//!
//! ```text
//! item #<seq> at <rfc3339 timestamp>: <length> bytes
//! <byte>, <byte>, ...
//! ```

use crate::core::{BoxedSink, Item, Sink, SinkError};
use chrono::Utc;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A sink writing item records to a file of its own
pub struct FileSink {
    dir: PathBuf,
    prefix: String,
    path: PathBuf,
    writer: BufWriter<File>,
    items_written: u64,
}

impl FileSink {
    /// Create a sink writing to a fresh file in `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Io`] if the file cannot be created.
    pub fn create(dir: impl AsRef<Path>, prefix: impl Into<String>) -> Result<Self, SinkError> {
        let dir = dir.as_ref().to_path_buf();
        let prefix = prefix.into();
        let path = dir.join(format!("{}_{}.log", prefix, Uuid::new_v4().simple()));

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;

        log::debug!("file sink opened {}", path.display());

        Ok(Self {
            dir,
            prefix,
            path,
            writer: BufWriter::new(file),
            items_written: 0,
        })
    }

    /// Path of the file this instance writes to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records written so far
    pub fn items_written(&self) -> u64 {
        self.items_written
    }

    fn write_record(&mut self, item: &Item) -> std::io::Result<()> {
        writeln!(
            self.writer,
            "item #{} at {}: {} bytes",
            self.items_written,
            Utc::now().to_rfc3339(),
            item.len()
        )?;

        let mut first = true;
        for byte in item.payload() {
            if !first {
                self.writer.write_all(b", ")?;
            }
            write!(self.writer, "{}", byte)?;
            first = false;
        }
        self.writer.write_all(b"\n")
    }
}

impl Sink for FileSink {
    fn on_item(&mut self, item: Item) -> Result<(), SinkError> {
        self.write_record(&item)?;
        self.items_written += 1;
        Ok(())
    }

    fn try_clone(&self) -> Result<BoxedSink, SinkError> {
        Ok(Box::new(FileSink::create(&self.dir, self.prefix.clone())?))
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "FileSink"
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            log::warn!("file sink {} failed to flush on drop: {}", self.path.display(), e);
        }
    }
}

impl std::fmt::Debug for FileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSink")
            .field("path", &self.path)
            .field("items_written", &self.items_written)
            .finish()
    }
}
