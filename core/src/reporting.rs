use crate::ledger::{MoveRecord, RunSummary};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter, Write as _};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

#[derive(Serialize)]
struct RunReport<'a> {
    generated_at: String,
    source: &'a Path,
    destination: &'a Path,
    summary: &'a RunSummary,
    moves: &'a [MoveRecord],
}

#[derive(Debug)]
pub enum ReportingError {
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
    Serialization(serde_json::Error),
}

impl Display for ReportingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { source, path } => write!(f, "io error for {}: {}", path.display(), source),
            Self::Serialization(error) => write!(f, "serialization error: {}", error),
        }
    }
}

impl Error for ReportingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Serialization(error) => Some(error),
        }
    }
}

/// Renders the end-of-run summary shown on the console.
pub fn format_summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Summary Report");
    let _ = writeln!(out, "{}", "=".repeat(20));
    let _ = writeln!(out, "Total files moved: {}", summary.moved.len());
    let _ = writeln!(out, "Moved files: {:?}", summary.moved);
    let _ = writeln!(out);
    let _ = writeln!(out, "Total files ignored: {}", summary.ignored.len());
    let _ = writeln!(out, "Ignored files: {:?}", summary.ignored);

    if !summary.errored.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Total files failed: {}", summary.errored.len());
        for failed in &summary.errored {
            let _ = writeln!(out, "  {}: {}", failed.name, failed.reason);
        }
    }
    out
}

pub fn print_summary(summary: &RunSummary) {
    println!();
    print!("{}", format_summary(summary));
}

/// Writes the summary and every move record as pretty JSON.
pub fn write_json(
    summary: &RunSummary,
    moves: &[MoveRecord],
    source: &Path,
    destination: &Path,
    output_path: &Path,
) -> Result<(), ReportingError> {
    if let Some(parent) = output_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        fs::create_dir_all(parent).map_err(|source| ReportingError::Io {
            source,
            path: parent.to_path_buf(),
        })?;
    }

    let report = RunReport {
        generated_at: OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| String::from("unknown")),
        source,
        destination,
        summary,
        moves,
    };

    let file = File::create(output_path).map_err(|source| ReportingError::Io {
        source,
        path: output_path.to_path_buf(),
    })?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &report).map_err(ReportingError::Serialization)
}
