//! Image sources: format detection and pixel size.

use deck_core::{Error, Result};
use std::path::Path;

/// Raster and vector formats PowerPoint embeds as pictures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
    Emf,
    Wmf,
}

impl ImageKind {
    /// Detect from magic bytes.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if bytes.starts_with(b"BM") {
            Some(Self::Bmp)
        } else if bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*") {
            Some(Self::Tiff)
        } else if bytes.len() >= 44 && bytes[0..4] == [1, 0, 0, 0] && bytes[40..44] == *b" EMF" {
            Some(Self::Emf)
        } else if bytes.starts_with(&[0xD7, 0xCD, 0xC6, 0x9A]) || bytes.starts_with(&[1, 0, 9, 0]) {
            Some(Self::Wmf)
        } else {
            None
        }
    }

    /// Detect from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" | "jpe" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "bmp" | "dib" => Some(Self::Bmp),
            "tif" | "tiff" => Some(Self::Tiff),
            "emf" => Some(Self::Emf),
            "wmf" => Some(Self::Wmf),
            _ => None,
        }
    }

    /// Extension used for the media part.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
            Self::Emf => "emf",
            Self::Wmf => "wmf",
        }
    }

    /// MIME content type registered for the extension.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
            Self::Emf => "image/x-emf",
            Self::Wmf => "image/x-wmf",
        }
    }
}

/// An image file read into memory.
#[derive(Debug, Clone)]
pub struct ImageSource {
    pub kind: ImageKind,
    pub data: Vec<u8>,
}

impl ImageSource {
    /// Read an image file, detecting its format from content and then extension.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let data = std::fs::read(path)?;
        let kind = ImageKind::from_magic(&data)
            .or_else(|| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .and_then(ImageKind::from_extension)
            })
            .ok_or_else(|| {
                Error::UnsupportedFormat(format!("unrecognized image format: {}", path.display()))
            })?;
        Ok(Self { kind, data })
    }
}

/// Pixel width and height of a raster image file.
pub fn pixel_size(path: &Path) -> Result<(u32, u32)> {
    if !path.is_file() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    image::image_dimensions(path).map_err(|e| {
        Error::UnsupportedFormat(format!("cannot read image size of {}: {}", path.display(), e))
    })
}
