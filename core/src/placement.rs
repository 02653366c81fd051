//! Moves one image into `<root>/<orientation>/<category>/<n>.<ext>` and
//! records the move.

use crate::aspect_ratio::{classify, AspectCategory, ClassifyError, Orientation};
use crate::inspector::{FileInspector, ImageInspector, InspectError};
use crate::ledger::{Ledger, LedgerError, MoveRecord};
use crate::sequence::{AllocationError, CountingAllocator, NameAllocator};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tracing::{debug, info};

/// Runs the classify, allocate, move, record pipeline for single files.
pub struct PlacementEngine<I = FileInspector, A = CountingAllocator> {
    root: PathBuf,
    inspector: I,
    allocator: A,
}

impl PlacementEngine {
    /// Engine with the file-backed inspector and the in-memory counter.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_parts(root, FileInspector, CountingAllocator::new())
    }
}

impl<I: ImageInspector, A: NameAllocator> PlacementEngine<I, A> {
    pub fn with_parts(root: impl Into<PathBuf>, inspector: I, allocator: A) -> Self {
        Self {
            root: root.into(),
            inspector,
            allocator,
        }
    }

    /// Folder that receives images of the given shape. Created on demand.
    pub fn destination_folder(&self, orientation: Orientation, category: AspectCategory) -> PathBuf {
        self.root.join(orientation.as_str()).join(category.label())
    }

    /// Creates the destination folder if needed. Existing folders and their
    /// contents are left alone.
    pub fn ensure_folder(&self, folder: &Path) -> Result<(), PlacementError> {
        fs::create_dir_all(folder).map_err(|source| PlacementError::Io {
            source,
            path: folder.to_path_buf(),
        })
    }

    /// Places `source` and appends the resulting record to `ledger`.
    ///
    /// The file has been moved by the time a [`PlacementError::Ledger`] is
    /// returned; every other error leaves it where it was.
    pub fn place<L: Ledger + ?Sized>(
        &mut self,
        source: &Path,
        ledger: &mut L,
    ) -> Result<MoveRecord, PlacementError> {
        let original_name = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| PlacementError::MissingFileName(source.to_path_buf()))?;
        let extension = source
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .ok_or_else(|| PlacementError::MissingExtension(source.to_path_buf()))?;

        let descriptor = self.inspector.inspect(source)?;
        let (orientation, category) = classify(descriptor.width, descriptor.height).map_err(
            |error| PlacementError::InvalidDimensions {
                path: source.to_path_buf(),
                error,
            },
        )?;
        debug!(
            file = %original_name,
            width = descriptor.width,
            height = descriptor.height,
            %orientation,
            %category,
            "classified image"
        );

        let folder = self.destination_folder(orientation, category);
        self.ensure_folder(&folder)?;

        let new_name = self.allocator.next_name(&folder, &extension)?;
        let destination = folder.join(&new_name);
        move_file(source, &destination)?;
        self.allocator.commit(&folder, &extension, &new_name);
        info!(from = %source.display(), to = %destination.display(), "moved image");

        let record = MoveRecord {
            timestamp: now(),
            original_path: absolute(source),
            new_path: absolute(&destination),
            original_name,
            new_name,
            orientation,
            category,
            metadata: descriptor.metadata,
        };
        ledger.record(record.clone())?;
        Ok(record)
    }
}

/// Renames `from` to `to`, falling back to copy and delete when a rename is
/// not possible (for example across filesystems).
pub fn move_file(from: &Path, to: &Path) -> Result<(), PlacementError> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_error) => copy_then_remove(from, to, rename_error, |path| fs::remove_file(path)),
    }
}

/// Copies `from` to `to` and removes `from`. If either step fails the copy is
/// discarded and `rename_error` is reported, so the source stays the only
/// version of the file.
fn copy_then_remove<R>(
    from: &Path,
    to: &Path,
    rename_error: std::io::Error,
    remove_source: R,
) -> Result<(), PlacementError>
where
    R: FnOnce(&Path) -> std::io::Result<()>,
{
    debug!(from = %from.display(), error = %rename_error, "rename failed, copying instead");
    let copied = fs::copy(from, to).and_then(|_| remove_source(from));
    if let Err(error) = copied {
        debug!(from = %from.display(), %error, "copy fallback failed");
        if from.exists() {
            let _ = fs::remove_file(to);
        }
        return Err(PlacementError::Move {
            source: rename_error,
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        });
    }
    Ok(())
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

#[derive(Debug)]
pub enum PlacementError {
    MissingFileName(PathBuf),
    MissingExtension(PathBuf),
    UnreadableImage(InspectError),
    InvalidDimensions {
        path: PathBuf,
        error: ClassifyError,
    },
    Allocation(AllocationError),
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
    Move {
        source: std::io::Error,
        from: PathBuf,
        to: PathBuf,
    },
    Ledger(LedgerError),
}

impl Display for PlacementError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingFileName(path) => write!(f, "file name not found for {}", path.display()),
            Self::MissingExtension(path) => {
                write!(f, "no file extension on {}", path.display())
            }
            Self::UnreadableImage(error) => write!(f, "{}", error),
            Self::InvalidDimensions { path, error } => {
                write!(f, "{} for {}", error, path.display())
            }
            Self::Allocation(error) => write!(f, "{}", error),
            Self::Io { source, path } => write!(f, "io error for {}: {}", path.display(), source),
            Self::Move { source, from, to } => write!(
                f,
                "failed to move {} to {}: {}",
                from.display(),
                to.display(),
                source
            ),
            Self::Ledger(error) => write!(f, "{}", error),
        }
    }
}

impl Error for PlacementError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UnreadableImage(error) => Some(error),
            Self::InvalidDimensions { error, .. } => Some(error),
            Self::Allocation(error) => Some(error),
            Self::Io { source, .. } | Self::Move { source, .. } => Some(source),
            Self::Ledger(error) => Some(error),
            _ => None,
        }
    }
}

impl From<InspectError> for PlacementError {
    fn from(error: InspectError) -> Self {
        Self::UnreadableImage(error)
    }
}

impl From<AllocationError> for PlacementError {
    fn from(error: AllocationError) -> Self {
        Self::Allocation(error)
    }
}

impl From<LedgerError> for PlacementError {
    fn from(error: LedgerError) -> Self {
        Self::Ledger(error)
    }
}
