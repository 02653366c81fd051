//! Orientation and nearest-standard aspect ratio classification.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Reference ratios for landscape images, in tie-break order.
/// Ratios are represented as `(width, height)`.
const LANDSCAPE_RATIOS: &[(AspectCategory, f64, f64)] = &[
    (AspectCategory::Wide, 16.0, 9.0),     // Widescreen video
    (AspectCategory::Standard, 4.0, 3.0),  // Standard TV / Monitor
];

/// Reference ratios for portrait images, in tie-break order.
const PORTRAIT_RATIOS: &[(AspectCategory, f64, f64)] = &[
    (AspectCategory::Tall, 9.0, 16.0),     // Phone screen
    (AspectCategory::Classic, 3.0, 4.0),   // Rotated camera frame
];

/// Landscape when `width >= height`, otherwise portrait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Landscape,
    Portrait,
}

impl Orientation {
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        if width >= height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }

    /// Directory name used for this orientation.
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Landscape => "Landscape",
            Orientation::Portrait => "Portrait",
        }
    }

    fn references(self) -> &'static [(AspectCategory, f64, f64)] {
        match self {
            Orientation::Landscape => LANDSCAPE_RATIOS,
            Orientation::Portrait => PORTRAIT_RATIOS,
        }
    }
}

impl Display for Orientation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standard aspect ratio bucket an image is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectCategory {
    /// 16:9
    #[serde(rename = "16:9")]
    Wide,
    /// 4:3
    #[serde(rename = "4:3")]
    Standard,
    /// 9:16
    #[serde(rename = "9:16")]
    Tall,
    /// 3:4
    #[serde(rename = "3:4")]
    Classic,
}

impl AspectCategory {
    /// The label, which doubles as the directory name.
    pub fn label(self) -> &'static str {
        match self {
            AspectCategory::Wide => "16:9",
            AspectCategory::Standard => "4:3",
            AspectCategory::Tall => "9:16",
            AspectCategory::Classic => "3:4",
        }
    }
}

impl Display for AspectCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifyError {
    InvalidDimensions { width: u32, height: u32 },
}

impl Display for ClassifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDimensions { width, height } => {
                write!(f, "invalid image dimensions {}x{}", width, height)
            }
        }
    }
}

impl Error for ClassifyError {}

/// Classifies an image by orientation and the closest standard aspect ratio
/// for that orientation.
///
/// Squares count as landscape. When two references are equally close, the
/// one declared first wins (16:9 before 4:3, 9:16 before 3:4).
///
/// # Errors
///
/// Returns [`ClassifyError::InvalidDimensions`] if either side is zero.
pub fn classify(width: u32, height: u32) -> Result<(Orientation, AspectCategory), ClassifyError> {
    if width == 0 || height == 0 {
        return Err(ClassifyError::InvalidDimensions { width, height });
    }

    let orientation = Orientation::from_dimensions(width, height);
    let aspect_ratio = width as f64 / height as f64;

    let mut closest = None;
    for &(category, standard_w, standard_h) in orientation.references() {
        let distance = (aspect_ratio - standard_w / standard_h).abs();
        match closest {
            Some((_, best)) if distance >= best => {}
            _ => closest = Some((category, distance)),
        }
    }

    let (closest, _) = closest.ok_or(ClassifyError::InvalidDimensions { width, height })?;
    Ok((orientation, closest))
}
