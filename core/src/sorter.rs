//! Runs the placement engine over every entry of a source folder.

use crate::config::{FailurePolicy, SortConfig};
use crate::inspector::ImageInspector;
use crate::ledger::{Ledger, LedgerError};
use crate::placement::{PlacementEngine, PlacementError};
use crate::sequence::NameAllocator;
use indicatif::ProgressBar;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Top-level entries of `root` sorted by file name.
pub fn list_entries(root: &Path) -> Result<Vec<walkdir::DirEntry>, SortError> {
    WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| SortError::Enumeration {
            path: root.to_path_buf(),
            reason: error.to_string(),
        })
}

/// Sorts every supported image in `config.source`, one at a time, in file
/// name order. Everything else is left in place and marked ignored.
///
/// Under [`FailurePolicy::Continue`] a file that cannot be placed is recorded
/// in the summary's failed list; under [`FailurePolicy::Abort`] the run stops
/// with [`SortError::Aborted`]. Ledger write failures always stop the run.
pub fn sort_images<I, A, L>(
    config: &SortConfig,
    engine: &mut PlacementEngine<I, A>,
    ledger: &mut L,
    progress_bar: &ProgressBar,
) -> Result<(), SortError>
where
    I: ImageInspector,
    A: NameAllocator,
    L: Ledger + ?Sized,
{
    let entries = list_entries(&config.source)?;
    progress_bar.set_length(entries.len() as u64);

    for entry in entries {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        progress_bar.inc(1);

        if !path.is_file() || !config.accepts(path) {
            debug!(file = %name, "ignoring");
            ledger.mark_ignored(name);
            continue;
        }

        progress_bar.set_message(format!("Sorting: {}", name));
        match engine.place(path, &mut *ledger) {
            Ok(record) => {
                let line = format!("Moved {} to {}", name, record.new_path.display());
                announce(progress_bar, &mut io::stdout().lock(), &line);
            }
            Err(PlacementError::Ledger(error)) => return Err(SortError::Ledger(error)),
            Err(error) => match config.failure_policy {
                FailurePolicy::Continue => {
                    warn!(file = %name, %error, "skipping file");
                    progress_bar.set_message(format!("Error: {}", error));
                    ledger.mark_errored(name, error.to_string());
                }
                FailurePolicy::Abort => {
                    return Err(SortError::Aborted {
                        path: path.to_path_buf(),
                        error,
                    })
                }
            },
        }
    }

    if ledger.summary().is_empty() {
        info!(source = %config.source.display(), "source folder has no entries");
    }
    Ok(())
}

/// Prints a per-move line above the bar, or straight to `out` when the bar
/// is hidden and would swallow it.
fn announce<W: Write>(progress_bar: &ProgressBar, out: &mut W, line: &str) {
    if progress_bar.is_hidden() {
        let _ = writeln!(out, "{}", line);
    } else {
        progress_bar.println(line);
    }
}

#[derive(Debug)]
pub enum SortError {
    Enumeration { path: PathBuf, reason: String },
    Aborted { path: PathBuf, error: PlacementError },
    Ledger(LedgerError),
}

impl Display for SortError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enumeration { path, reason } => {
                write!(f, "unable to read {}: {}", path.display(), reason)
            }
            Self::Aborted { path, error } => {
                write!(f, "stopped at {}: {}", path.display(), error)
            }
            Self::Ledger(error) => write!(f, "{}", error),
        }
    }
}

impl Error for SortError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Aborted { error, .. } => Some(error),
            Self::Ledger(error) => Some(error),
            Self::Enumeration { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{MemoryLedger, MoveLedger};
    use image::{ImageFormat, RgbImage};
    use std::fs;
    use tempfile::tempdir;

    fn write_image(path: &Path, width: u32, height: u32, format: ImageFormat) {
        RgbImage::new(width, height)
            .save_with_format(path, format)
            .unwrap();
    }

    #[test]
    fn sorts_mixed_folder_end_to_end() {
        let source = tempdir().unwrap();
        let target = tempdir().unwrap();
        let logs = tempdir().unwrap();
        write_image(&source.path().join("a.jpg"), 192, 108, ImageFormat::Jpeg);
        write_image(&source.path().join("b.png"), 108, 192, ImageFormat::Png);
        fs::write(source.path().join("c.txt"), b"notes").unwrap();

        let log_path = logs.path().join("log.txt");
        let config = SortConfig::new(source.path(), target.path())
            .unwrap()
            .with_log_path(log_path.clone());
        let mut engine = PlacementEngine::new(&config.destination);
        let mut ledger = MoveLedger::create(&config.log_path).unwrap();

        sort_images(&config, &mut engine, &mut ledger, &ProgressBar::hidden()).unwrap();

        assert!(target.path().join("Landscape/16:9/1.jpg").exists());
        assert!(target.path().join("Portrait/9:16/1.png").exists());
        assert!(!source.path().join("a.jpg").exists());
        assert!(!source.path().join("b.png").exists());
        assert!(source.path().join("c.txt").exists());

        let summary = ledger.summary();
        assert_eq!(summary.moved, vec!["1.jpg", "1.png"]);
        assert_eq!(summary.ignored, vec!["c.txt"]);
        assert!(summary.errored.is_empty());

        let log = fs::read_to_string(&log_path).unwrap();
        let lines: Vec<_> = log.lines().collect();
        assert_eq!(lines.len(), 2 + 2);
        for (line, name) in lines[2..].iter().zip(&summary.moved) {
            assert!(line.ends_with(&format!("New Name: {}", name)));
        }
        assert!(lines[2].contains("Original Name: a.jpg"));
    }

    #[test]
    fn hidden_bar_prints_moves_to_output() {
        let mut out = Vec::new();
        announce(&ProgressBar::hidden(), &mut out, "Moved a.jpg to /sorted/1.jpg");
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Moved a.jpg to /sorted/1.jpg\n"
        );
    }

    #[test]
    fn empty_source_yields_empty_summary() {
        let source = tempdir().unwrap();
        let target = tempdir().unwrap();

        let config = SortConfig::new(source.path(), target.path()).unwrap();
        let mut engine = PlacementEngine::new(target.path());
        let mut ledger = MemoryLedger::new();
        sort_images(&config, &mut engine, &mut ledger, &ProgressBar::hidden()).unwrap();

        assert!(ledger.summary().is_empty());
        assert_eq!(fs::read_dir(target.path()).unwrap().count(), 0);
    }

    #[test]
    fn custom_extensions_limit_what_moves() {
        let source = tempdir().unwrap();
        let target = tempdir().unwrap();
        write_image(&source.path().join("a.png"), 192, 108, ImageFormat::Png);
        write_image(&source.path().join("b.jpg"), 192, 108, ImageFormat::Jpeg);

        let config = SortConfig::new(source.path(), target.path())
            .unwrap()
            .with_extensions([".PNG"]);
        let mut engine = PlacementEngine::new(target.path());
        let mut ledger = MemoryLedger::new();
        sort_images(&config, &mut engine, &mut ledger, &ProgressBar::hidden()).unwrap();

        assert_eq!(ledger.summary().moved, vec!["1.png"]);
        assert_eq!(ledger.summary().ignored, vec!["b.jpg"]);
        assert!(source.path().join("b.jpg").exists());
    }

    #[test]
    fn upper_case_extension_is_normalised() {
        let source = tempdir().unwrap();
        let target = tempdir().unwrap();
        write_image(&source.path().join("PHOTO.JPG"), 64, 48, ImageFormat::Jpeg);
        fs::write(source.path().join("photo.bmp"), b"bmp").unwrap();

        let config = SortConfig::new(source.path(), target.path()).unwrap();
        let mut engine = PlacementEngine::new(target.path());
        let mut ledger = MemoryLedger::new();
        sort_images(&config, &mut engine, &mut ledger, &ProgressBar::hidden()).unwrap();

        assert!(target.path().join("Landscape/4:3/1.jpg").exists());
        assert_eq!(ledger.summary().ignored, vec!["photo.bmp"]);
        assert!(source.path().join("photo.bmp").exists());
    }

    #[test]
    fn numbers_follow_file_name_order() {
        let source = tempdir().unwrap();
        let target = tempdir().unwrap();
        for name in ["c.png", "a.png", "b.png"] {
            write_image(&source.path().join(name), 48, 64, ImageFormat::Png);
        }

        let config = SortConfig::new(source.path(), target.path()).unwrap();
        let mut engine = PlacementEngine::new(target.path());
        let mut ledger = MemoryLedger::new();
        sort_images(&config, &mut engine, &mut ledger, &ProgressBar::hidden()).unwrap();

        let originals: Vec<_> = ledger
            .records
            .iter()
            .map(|record| (record.original_name.as_str(), record.new_name.as_str()))
            .collect();
        assert_eq!(
            originals,
            vec![("a.png", "1.png"), ("b.png", "2.png"), ("c.png", "3.png")]
        );
    }

    #[test]
    fn continues_past_unreadable_images() {
        let source = tempdir().unwrap();
        let target = tempdir().unwrap();
        fs::write(source.path().join("a.gif"), b"garbage").unwrap();
        write_image(&source.path().join("b.png"), 192, 108, ImageFormat::Png);
        fs::create_dir(source.path().join("nested.jpg")).unwrap();

        let config = SortConfig::new(source.path(), target.path()).unwrap();
        let mut engine = PlacementEngine::new(target.path());
        let mut ledger = MemoryLedger::new();
        sort_images(&config, &mut engine, &mut ledger, &ProgressBar::hidden()).unwrap();

        let summary = ledger.summary();
        assert_eq!(summary.moved, vec!["1.png"]);
        assert_eq!(summary.ignored, vec!["nested.jpg"]);
        assert_eq!(summary.errored.len(), 1);
        assert_eq!(summary.errored[0].name, "a.gif");
        assert!(source.path().join("a.gif").exists());
    }

    #[test]
    fn abort_policy_stops_at_first_failure() {
        let source = tempdir().unwrap();
        let target = tempdir().unwrap();
        fs::write(source.path().join("a.gif"), b"garbage").unwrap();
        write_image(&source.path().join("b.png"), 192, 108, ImageFormat::Png);

        let config = SortConfig::new(source.path(), target.path())
            .unwrap()
            .with_failure_policy(FailurePolicy::Abort);
        let mut engine = PlacementEngine::new(target.path());
        let mut ledger = MemoryLedger::new();
        let error =
            sort_images(&config, &mut engine, &mut ledger, &ProgressBar::hidden()).unwrap_err();

        assert!(matches!(error, SortError::Aborted { .. }));
        assert!(ledger.summary().moved.is_empty());
        assert!(source.path().join("b.png").exists());
    }

    #[test]
    fn destination_inside_source_is_not_revisited() {
        let source = tempdir().unwrap();
        let target = source.path().join("sorted");
        fs::create_dir(&target).unwrap();
        write_image(&source.path().join("a.png"), 192, 108, ImageFormat::Png);

        let config = SortConfig::new(source.path(), &target).unwrap();
        let mut engine = PlacementEngine::new(&target);
        let mut ledger = MemoryLedger::new();
        sort_images(&config, &mut engine, &mut ledger, &ProgressBar::hidden()).unwrap();

        assert_eq!(ledger.summary().moved, vec!["1.png"]);
        assert_eq!(ledger.summary().ignored, vec!["sorted"]);
    }
}
