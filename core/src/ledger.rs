//! Append-only move log and the in-run summary of moved and ignored files.

use crate::aspect_ratio::{AspectCategory, Orientation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

const LOG_TITLE: &str = "File Move Log";
const LOG_RULE_WIDTH: usize = 50;
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// A single completed relocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub original_path: PathBuf,
    pub new_path: PathBuf,
    pub original_name: String,
    pub new_name: String,
    pub orientation: Orientation,
    pub category: AspectCategory,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub metadata: BTreeMap<String, String>,
}

impl MoveRecord {
    /// The pipe-delimited line written to the move log.
    pub fn log_line(&self) -> String {
        let timestamp = self
            .timestamp
            .format(TIMESTAMP_FORMAT)
            .unwrap_or_else(|_| String::from("unknown"));
        format!(
            "{} | Original Path: {} | New Path: {} | Original Name: {} | New Name: {}",
            timestamp,
            self.original_path.display(),
            self.new_path.display(),
            self.original_name,
            self.new_name
        )
    }
}

/// A file whose placement failed while the run carried on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedFile {
    pub name: String,
    pub reason: String,
}

/// Moved, ignored and failed files for one run, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub moved: Vec<String>,
    pub ignored: Vec<String>,
    #[serde(default)]
    pub errored: Vec<FailedFile>,
}

impl RunSummary {
    pub fn is_empty(&self) -> bool {
        self.moved.is_empty() && self.ignored.is_empty() && self.errored.is_empty()
    }
}

/// Sink for move records and per-run bookkeeping.
pub trait Ledger {
    fn record(&mut self, record: MoveRecord) -> Result<(), LedgerError>;
    fn mark_ignored(&mut self, file_name: String);
    fn mark_errored(&mut self, file_name: String, reason: String);
    fn summary(&self) -> &RunSummary;
}

/// File-backed ledger. Each run truncates the log and starts a fresh header.
pub struct MoveLedger {
    path: PathBuf,
    writer: BufWriter<File>,
    summary: RunSummary,
    records: Vec<MoveRecord>,
}

impl MoveLedger {
    /// Truncates (or creates) the log at `path` and writes the header.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        let path = path.as_ref();
        let io_error = |source| LedgerError::Io {
            source,
            path: path.to_path_buf(),
        };
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let file = File::create(path).map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", LOG_TITLE).map_err(io_error)?;
        writeln!(writer, "{}", "=".repeat(LOG_RULE_WIDTH)).map_err(io_error)?;
        writer.flush().map_err(io_error)?;

        Ok(Self {
            path: path.to_path_buf(),
            writer,
            summary: RunSummary::default(),
            records: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records appended during this run.
    pub fn records(&self) -> &[MoveRecord] {
        &self.records
    }
}

impl Ledger for MoveLedger {
    fn record(&mut self, record: MoveRecord) -> Result<(), LedgerError> {
        self.summary.moved.push(record.new_name.clone());
        let line = record.log_line();
        self.records.push(record);

        let path = &self.path;
        let io_error = |source| LedgerError::Io {
            source,
            path: path.clone(),
        };
        writeln!(self.writer, "{}", line).map_err(io_error)?;
        self.writer.flush().map_err(io_error)
    }

    fn mark_ignored(&mut self, file_name: String) {
        self.summary.ignored.push(file_name);
    }

    fn mark_errored(&mut self, file_name: String, reason: String) {
        self.summary.errored.push(FailedFile {
            name: file_name,
            reason,
        });
    }

    fn summary(&self) -> &RunSummary {
        &self.summary
    }
}

impl std::fmt::Debug for MoveLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoveLedger")
            .field("path", &self.path)
            .field("summary", &self.summary)
            .finish()
    }
}

/// Ledger that keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    pub records: Vec<MoveRecord>,
    summary: RunSummary,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Ledger for MemoryLedger {
    fn record(&mut self, record: MoveRecord) -> Result<(), LedgerError> {
        self.summary.moved.push(record.new_name.clone());
        self.records.push(record);
        Ok(())
    }

    fn mark_ignored(&mut self, file_name: String) {
        self.summary.ignored.push(file_name);
    }

    fn mark_errored(&mut self, file_name: String, reason: String) {
        self.summary.errored.push(FailedFile {
            name: file_name,
            reason,
        });
    }

    fn summary(&self) -> &RunSummary {
        &self.summary
    }
}

#[derive(Debug)]
pub enum LedgerError {
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
}

impl Display for LedgerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { source, path } => {
                write!(f, "unable to write move log {}: {}", path.display(), source)
            }
        }
    }
}

impl Error for LedgerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
        }
    }
}
