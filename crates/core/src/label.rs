//! Text and placement of the visible provenance label.
//!
//! The label is a single right-aligned text block in the bottom-right
//! corner of the slide, one line per inserted image.

use crate::geometry::{Position, SlideSize};
use std::path::{Component, Path, PathBuf};

/// Gap between the label and the slide's right and bottom edges, in inches.
pub const LABEL_MARGIN: f64 = 0.1;

/// Preferred label width, in inches.
pub const LABEL_WIDTH: f64 = 5.0;

/// Height budget per text line, in inches.
pub const LABEL_LINE_HEIGHT: f64 = 0.18;

/// Extra height for the text box insets, in inches.
pub const LABEL_PADDING: f64 = 0.1;

/// Label font size in points.
pub const LABEL_FONT_SIZE: u32 = 8;

/// Label font face.
pub const LABEL_FONT_NAME: &str = "Arial";

/// Shape name given to the label so it can be found again.
pub const LABEL_SHAPE_NAME: &str = "Image Label";

/// Line used when a slide has pictures but none carry provenance.
pub const TEMPLATE_SLIDE_LINE: &str = "TEMPLATE SLIDE";

/// Line used for one picture without provenance (1-based).
pub fn placeholder_line(number: usize) -> String {
    format!("[placeholder {}]", number)
}

/// Render an image path for the label.
///
/// Absolute paths are shown relative to `base_dir` when one is given;
/// everything else is shown as is.
pub fn display_path(path: &Path, base_dir: Option<&Path>) -> String {
    let base = match base_dir {
        Some(base) if !base.as_os_str().is_empty() && path.is_absolute() => base,
        _ => return path.display().to_string(),
    };

    let base = std::path::absolute(base).unwrap_or_else(|_| base.to_path_buf());
    match relative_path(path, &base) {
        Some(rel) => rel.display().to_string(),
        None => path.display().to_string(),
    }
}

/// Express `path` relative to `base`, walking up with `..` where needed.
///
/// Returns `None` when the two share no root (different drives on Windows).
pub fn relative_path(path: &Path, base: &Path) -> Option<PathBuf> {
    let path_parts: Vec<Component> = path.components().collect();
    let base_parts: Vec<Component> = base
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    let common = path_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let shares_root = path_parts
        .iter()
        .take(common)
        .any(|c| matches!(c, Component::RootDir | Component::Prefix(_)));
    if !shares_root {
        return None;
    }

    let mut rel = PathBuf::new();
    for _ in common..base_parts.len() {
        rel.push("..");
    }
    for part in &path_parts[common..] {
        rel.push(part.as_os_str());
    }
    if rel.as_os_str().is_empty() {
        rel.push(".");
    }
    Some(rel)
}

/// One label line per inserted image.
pub fn compose_lines<P: AsRef<Path>>(paths: &[P], base_dir: Option<&Path>) -> Vec<String> {
    paths
        .iter()
        .map(|p| display_path(p.as_ref(), base_dir))
        .collect()
}

/// Where the label goes for `line_count` lines on a slide of `size`.
pub fn label_position(size: SlideSize, line_count: usize) -> Position {
    let slide_width = size.width_inches();
    let slide_height = size.height_inches();

    let width = LABEL_WIDTH.min(slide_width - 2.0 * LABEL_MARGIN).max(0.0);
    let height = line_count.max(1) as f64 * LABEL_LINE_HEIGHT + LABEL_PADDING;

    Position {
        left: (slide_width - LABEL_MARGIN - width).max(0.0),
        top: (slide_height - LABEL_MARGIN - height).max(0.0),
        width,
        height,
    }
}
