//! Output sinks for emitted aggregate records

use crate::record::GenericMap;
use async_trait::async_trait;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub enum WriterError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
}

impl From<std::io::Error> for WriterError {
    fn from(err: std::io::Error) -> Self {
        WriterError::Io(err)
    }
}

impl From<serde_json::Error> for WriterError {
    fn from(err: serde_json::Error) -> Self {
        WriterError::Serialization(err)
    }
}

impl std::fmt::Display for WriterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriterError::Io(e) => write!(f, "IO error: {}", e),
            WriterError::Serialization(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for WriterError {}

/// Backend trait for writing emitted records
#[async_trait]
pub trait AggregateWriterBackend: Send {
    /// Write a single record
    async fn write_record(&mut self, record: &GenericMap) -> Result<(), WriterError>;

    /// Flush pending writes
    async fn flush(&mut self) -> Result<(), WriterError>;

    /// Backend type for logging
    fn backend_type(&self) -> &'static str;
}

/// One JSON object per line, to a file or stdout
pub struct JsonlWriter {
    writer: BufWriter<Box<dyn Write + Send>>,
    last_flush: Instant,
    written: u64,
}

impl JsonlWriter {
    pub fn new(inner: Box<dyn Write + Send>) -> Self {
        Self {
            writer: BufWriter::new(inner),
            last_flush: Instant::now(),
            written: 0,
        }
    }

    /// Append to `path`, creating it if needed
    pub fn to_file(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        log::info!("📝 Writing aggregates to: {}", path.display());
        Ok(Self::new(Box::new(file)))
    }

    pub fn to_stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn write_record(&mut self, record: &GenericMap) -> Result<(), WriterError> {
        let json = serde_json::to_string(record)?;
        writeln!(self.writer, "{}", json)?;
        self.written += 1;

        // Flush every 5 seconds
        if self.last_flush.elapsed() > Duration::from_secs(5) {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()?;
        self.last_flush = Instant::now();
        Ok(())
    }
}

impl Drop for JsonlWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

#[async_trait]
impl AggregateWriterBackend for JsonlWriter {
    async fn write_record(&mut self, record: &GenericMap) -> Result<(), WriterError> {
        JsonlWriter::write_record(self, record)
    }

    async fn flush(&mut self) -> Result<(), WriterError> {
        JsonlWriter::flush(self)?;
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "JSONL"
    }
}
