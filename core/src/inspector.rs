//! Reads pixel dimensions and EXIF tags from image files.

use image::ImageReader;
use kamadak_exif::Reader;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Dimensions and opaque metadata for one source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
    pub width: u32,
    pub height: u32,
    /// EXIF tag name to display value. Empty when the file carries no EXIF.
    pub metadata: BTreeMap<String, String>,
}

impl ImageDescriptor {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            metadata: BTreeMap::new(),
        }
    }
}

/// Source of [`ImageDescriptor`]s for the placement engine.
pub trait ImageInspector {
    fn inspect(&self, path: &Path) -> Result<ImageDescriptor, InspectError>;
}

/// Inspector backed by the `image` decoder and `kamadak-exif`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileInspector;

impl ImageInspector for FileInspector {
    fn inspect(&self, path: &Path) -> Result<ImageDescriptor, InspectError> {
        let (width, height) = read_dimensions(path)?;
        Ok(ImageDescriptor {
            width,
            height,
            metadata: read_exif_tags(path),
        })
    }
}

fn read_dimensions(path: &Path) -> Result<(u32, u32), InspectError> {
    let unreadable = |reason: String| InspectError::Unreadable {
        path: path.to_path_buf(),
        reason,
    };

    ImageReader::open(path)
        .map_err(|error| unreadable(error.to_string()))?
        .with_guessed_format()
        .map_err(|error| unreadable(error.to_string()))?
        .into_dimensions()
        .map_err(|error| unreadable(error.to_string()))
}

/// Collects every EXIF field by tag name. The first occurrence of a tag wins,
/// so primary-image values shadow thumbnail ones.
fn read_exif_tags(path: &Path) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    let Ok(file) = File::open(path) else {
        return tags;
    };
    let mut buffer = BufReader::new(file);
    let Ok(exif) = Reader::new().read_from_container(&mut buffer) else {
        return tags;
    };

    for field in exif.fields() {
        tags.entry(field.tag.to_string())
            .or_insert_with(|| field.display_value().with_unit(&exif).to_string());
    }
    tags
}

#[derive(Debug)]
pub enum InspectError {
    Unreadable { path: PathBuf, reason: String },
}

impl Display for InspectError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreadable { path, reason } => {
                write!(f, "unable to read image {}: {}", path.display(), reason)
            }
        }
    }
}

impl Error for InspectError {}
