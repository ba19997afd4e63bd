//! Supported on-disk formats.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CodecError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Plain-text PPM (`P3`).
    Ppm,
    /// PNG.
    Png,
    /// Baseline JPEG.
    Jpeg,
}

impl ImageFormat {
    /// Canonical file extension, without the dot.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Ppm => "ppm",
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::Ppm, Self::Png, Self::Jpeg]
    }

    /// Match an extension case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "ppm" => Some(Self::Ppm),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    /// Guess the format from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self, CodecError> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| CodecError::UnsupportedFormat(path.display().to_string()))
    }

    pub(crate) fn as_image_format(self) -> Option<image::ImageFormat> {
        match self {
            Self::Ppm => None,
            Self::Png => Some(image::ImageFormat::Png),
            Self::Jpeg => Some(image::ImageFormat::Jpeg),
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ppm => write!(f, "PPM"),
            Self::Png => write!(f, "PNG"),
            Self::Jpeg => write!(f, "JPEG"),
        }
    }
}

impl FromStr for ImageFormat {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s.trim()).ok_or_else(|| CodecError::UnsupportedFormat(s.to_owned()))
    }
}
