//! Error types for slide image insertion.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading, editing or saving a presentation.
#[derive(Error, Debug)]
pub enum Error {
    /// A presentation, image or config file does not exist.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The slide has no pictures to read a geometry from.
    #[error("Slide {slide} has no pictures")]
    NoPictures { slide: usize },

    /// A slide or picture index is outside the valid range.
    #[error("{what} index {index} out of range ({len} available)")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// A semantic contract was violated (count mismatch, nothing to infer from, ...).
    #[error("{0}")]
    InvalidValue(String),

    /// The file could not be written, usually because it is open elsewhere.
    #[error("Permission denied writing {}; make sure the file is not open in PowerPoint", .0.display())]
    PermissionDenied(PathBuf),

    /// Failed to open, read or copy a file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The file format is not supported or could not be detected.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// Invalid or corrupted file.
    #[error("Invalid or corrupted file: {0}")]
    CorruptedFile(String),

    /// ZIP archive error.
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing or writing error.
    #[error("XML error: {0}")]
    XmlError(String),

    /// The batch configuration is missing fields or malformed.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl Error {
    /// Shorthand for a slide index error.
    pub fn slide_index(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange {
            what: "Slide",
            index,
            len,
        }
    }

    /// Map an I/O error raised while writing `path`, singling out permission problems.
    pub fn from_write(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        if err.kind() == std::io::ErrorKind::PermissionDenied {
            Self::PermissionDenied(path.into())
        } else {
            Self::IoError(err)
        }
    }
}
