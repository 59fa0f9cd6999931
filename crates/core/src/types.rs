//! Domain types shared by the backend and the CLI.

use crate::geometry::Position;
use serde::{Deserialize, Serialize};

/// The format of a presentation file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresentationFormat {
    /// Modern PPTX (Office Open XML).
    Pptx,
    /// Legacy PPT (OLE/CFB binary). Recognized only to be rejected.
    Ppt,
}

impl PresentationFormat {
    /// Detect format from file magic bytes.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // PPTX is a ZIP file (PK\x03\x04)
        if bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
            return Some(Self::Pptx);
        }

        // PPT is an OLE/CFB file (D0 CF 11 E0 A1 B1 1A E1)
        if bytes.len() >= 8
            && bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1])
        {
            return Some(Self::Ppt);
        }

        None
    }
}

/// Source path and display name stored out of band on a picture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Full path of the original image (alt-text description).
    pub path: Option<String>,

    /// Display filename (alt-text title).
    pub name: Option<String>,
}

impl Provenance {
    /// Build a provenance pair for an image file: the path as given and its basename.
    pub fn for_image(path: &std::path::Path) -> Self {
        Self {
            path: Some(path.display().to_string()),
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned()),
        }
    }

    /// Whether nothing was stored.
    pub fn is_empty(&self) -> bool {
        self.path.is_none() && self.name.is_none()
    }
}

/// One line of a slide listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideSummary {
    /// 0-based slide index.
    pub index: usize,

    /// Title placeholder text, or "Untitled".
    pub title: String,
}

/// Provenance and placement of one picture, as reported by metadata extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// 0-based slide index.
    pub slide_index: usize,

    /// 1-based slide number as shown in PowerPoint.
    pub slide_number: usize,

    /// Original image path from the alt-text description, if stored.
    pub original_path: Option<String>,

    /// Alt-text title, falling back to the embedded media file name.
    pub filename: Option<String>,

    /// Position and size in inches.
    pub position: Position,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_format_from_magic() {
        assert_eq!(
            PresentationFormat::from_magic(b"PK\x03\x04rest"),
            Some(PresentationFormat::Pptx)
        );
        assert_eq!(
            PresentationFormat::from_magic(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]),
            Some(PresentationFormat::Ppt)
        );
        assert_eq!(PresentationFormat::from_magic(b"abc"), None);
    }

    #[test]
    fn test_provenance_for_image() {
        let prov = Provenance::for_image(Path::new("/data/plots/run1.png"));
        assert_eq!(prov.path.as_deref(), Some("/data/plots/run1.png"));
        assert_eq!(prov.name.as_deref(), Some("run1.png"));
        assert!(!prov.is_empty());
        assert!(Provenance::default().is_empty());
    }
}
