//! Read-only views of a presentation: slide titles and picture metadata.

use crate::position::picture_rects;
use crate::presentation::Presentation;
use crate::rels::resolve_target;
use crate::shapes::Slide;
use deck_core::{Error, ImageMetadata, Result, SlideSummary};
use std::path::Path;

const UNTITLED: &str = "Untitled";

/// Index and title of every slide in a presentation file.
pub fn list_slides(path: &Path) -> Result<Vec<SlideSummary>> {
    if !path.is_file() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let pres = Presentation::open(path)?;
    Ok(slide_summaries(&pres))
}

/// Index and title of every slide.
pub fn slide_summaries(pres: &Presentation) -> Vec<SlideSummary> {
    pres.slides()
        .iter()
        .enumerate()
        .map(|(index, slide)| SlideSummary {
            index,
            title: slide_title(slide).unwrap_or_else(|| UNTITLED.to_string()),
        })
        .collect()
}

/// Text of the title placeholder, if it has any.
pub fn slide_title(slide: &Slide) -> Option<String> {
    slide
        .shapes()
        .into_iter()
        .find(|shape| shape.placeholder().is_some_and(|ph| ph.is_title()))
        .map(|shape| shape.text())
        .filter(|text| !text.trim().is_empty())
}

/// Provenance and position of every picture in a presentation file.
pub fn extract_image_metadata(path: &Path) -> Result<Vec<ImageMetadata>> {
    if !path.is_file() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let pres = Presentation::open(path)?;
    image_metadata(&pres)
}

/// Provenance and position of every picture, slide by slide in document order.
pub fn image_metadata(pres: &Presentation) -> Result<Vec<ImageMetadata>> {
    let mut entries = Vec::new();
    for (slide_index, slide) in pres.slides().iter().enumerate() {
        let rects = picture_rects(pres, slide_index)?;
        for (picture, rect) in slide.pictures().iter().zip(rects) {
            let provenance = picture.provenance();
            let filename = provenance.name.or_else(|| {
                // Fall back to the embedded media part's file name
                let rel = slide.relationships().get(picture.embed_id()?)?;
                let part = resolve_target(slide.part_name(), &rel.target);
                part.rsplit('/').next().map(str::to_string)
            });
            entries.push(ImageMetadata {
                slide_index,
                slide_number: slide_index + 1,
                original_path: provenance.path,
                filename,
                position: rect.to_position(),
            });
        }
    }
    Ok(entries)
}
