//! Document-level replacement workflows: copy the template slide and fill
//! it with new images, or swap the image on an existing slide.
//!
//! Every workflow validates its inputs before loading the presentation,
//! edits it in memory and writes it back once at the end.

use crate::label::{add_label, remove_labels};
use crate::mutator::{
    duplicate_slide, insert_picture, remove_all_text, remove_free_text_boxes, remove_pictures,
    set_provenance,
};
use crate::position::{get_all_positions, picture_rects};
use crate::presentation::Presentation;
use deck_core::label::{compose_lines, display_path, placeholder_line, TEMPLATE_SLIDE_LINE};
use deck_core::{Error, Position, Provenance, Result};
use std::path::{Path, PathBuf};

/// Optional enrichment applied to inserted pictures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertOptions {
    /// Stamp each picture with its absolute source path and file name.
    pub store_metadata: bool,
    /// Add the bottom-right label listing the image paths.
    pub add_label: bool,
    /// Absolute image paths are shown relative to this directory in the label.
    pub base_dir: Option<PathBuf>,
}

impl Default for InsertOptions {
    fn default() -> Self {
        Self {
            store_metadata: true,
            add_label: false,
            base_dir: None,
        }
    }
}

impl InsertOptions {
    pub fn with_label(mut self, add_label: bool) -> Self {
        self.add_label = add_label;
        self
    }

    pub fn with_metadata(mut self, store_metadata: bool) -> Self {
        self.store_metadata = store_metadata;
        self
    }

    pub fn with_base_dir(mut self, base_dir: Option<PathBuf>) -> Self {
        self.base_dir = base_dir;
        self
    }
}

/// Copy the template slide to the end of the deck and put one image at each
/// of its picture positions. Returns the new slide's index.
///
/// Without explicit `positions` the template's pictures are read in reading
/// order, and `images` must match them one to one.
pub fn copy_slide_replace_images<P: AsRef<Path>>(
    path: &Path,
    template_index: usize,
    images: &[P],
    positions: Option<&[Position]>,
    options: &InsertOptions,
) -> Result<usize> {
    check_files(path, images)?;

    let mut pres = Presentation::open(path)?;
    let index = replace_images_in_copy(&mut pres, template_index, images, positions, options)?;
    pres.save(path)?;

    log::info!(
        "Added slide {} with {} image(s) to {}",
        index,
        images.len(),
        path.display()
    );
    Ok(index)
}

/// Single-image form of [`copy_slide_replace_images`].
pub fn copy_slide_replace_image(
    path: &Path,
    template_index: usize,
    image: &Path,
    position: Option<Position>,
    options: &InsertOptions,
) -> Result<usize> {
    let positions = position.map(|p| [p]);
    copy_slide_replace_images(
        path,
        template_index,
        &[image],
        positions.as_ref().map(|p| p.as_slice()),
        options,
    )
}

/// In-memory core of [`copy_slide_replace_images`].
///
/// Positions and counts are checked before the template is duplicated, so
/// a mismatch leaves the slide list unchanged.
pub fn replace_images_in_copy<P: AsRef<Path>>(
    pres: &mut Presentation,
    template_index: usize,
    images: &[P],
    positions: Option<&[Position]>,
    options: &InsertOptions,
) -> Result<usize> {
    pres.slide(template_index)?;
    if images.is_empty() {
        return Err(Error::InvalidValue("no images given".into()));
    }

    let positions = match positions {
        Some(positions) => positions.to_vec(),
        None => {
            let detected = get_all_positions(pres, template_index)?;
            if detected.is_empty() {
                return Err(Error::InvalidValue(format!(
                    "template slide {} has no picture to take a position from",
                    template_index
                )));
            }
            detected
        }
    };
    if positions.len() != images.len() {
        return Err(Error::InvalidValue(format!(
            "{} image(s) given but {} position(s) available",
            images.len(),
            positions.len()
        )));
    }

    let index = duplicate_slide(pres, template_index)?;
    {
        let slide = pres.slide_mut(index)?;
        remove_pictures(slide);
        remove_all_text(slide);
    }

    for (image, position) in images.iter().zip(&positions) {
        let image = image.as_ref();
        let id = insert_picture(pres, index, image, *position, None)?;
        if options.store_metadata {
            stamp_provenance(pres, index, id, image);
        }
    }

    if options.add_label {
        let lines = compose_lines(images, options.base_dir.as_deref());
        label_slide(pres, index, &lines);
    }

    Ok(index)
}

/// Replace the image on an existing slide, keeping the first picture's geometry.
///
/// Free text boxes (earlier labels) are removed along with the pictures;
/// placeholder text stays.
pub fn replace_image_on_existing_slide(
    path: &Path,
    slide_index: usize,
    image: &Path,
    options: &InsertOptions,
) -> Result<()> {
    check_files(path, &[image])?;

    let mut pres = Presentation::open(path)?;
    let rect = picture_rects(&pres, slide_index)?
        .into_iter()
        .next()
        .ok_or_else(|| {
            Error::InvalidValue(format!("slide {} has no picture to replace", slide_index))
        })?;

    {
        let slide = pres.slide_mut(slide_index)?;
        remove_pictures(slide);
        remove_free_text_boxes(slide);
    }

    let id = insert_picture(&mut pres, slide_index, image, rect.to_position(), None)?;
    if options.store_metadata {
        stamp_provenance(&mut pres, slide_index, id, image);
    }
    if options.add_label {
        let lines = compose_lines(&[image], options.base_dir.as_deref());
        label_slide(&mut pres, slide_index, &lines);
    }

    pres.save(path)?;
    log::info!(
        "Replaced image on slide {} of {}",
        slide_index,
        path.display()
    );
    Ok(())
}

/// Label an existing slide from the provenance stored on its pictures.
///
/// Returns `false` without writing when the slide has no pictures.
pub fn add_label_to_existing_slide(
    path: &Path,
    slide_index: usize,
    base_dir: Option<&Path>,
) -> Result<bool> {
    if !path.is_file() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let mut pres = Presentation::open(path)?;

    let rects = picture_rects(&pres, slide_index)?;
    if rects.is_empty() {
        log::debug!("Slide {} has no pictures, nothing to label", slide_index);
        return Ok(false);
    }

    let slide = pres.slide(slide_index)?;
    let mut entries: Vec<(Position, Provenance)> = rects
        .iter()
        .map(|rect| rect.to_position())
        .zip(slide.pictures().iter().map(|pic| pic.provenance()))
        .collect();
    entries.sort_by_key(|(position, _)| position.reading_order_key());

    let lines = label_lines(&entries, base_dir);
    let size = pres.slide_size();
    let slide = pres.slide_mut(slide_index)?;
    remove_labels(slide);
    add_label(slide, &lines, size)?;

    pres.save(path)?;
    log::info!("Labelled slide {} of {}", slide_index, path.display());
    Ok(true)
}

fn label_lines(entries: &[(Position, Provenance)], base_dir: Option<&Path>) -> Vec<String> {
    if entries.iter().all(|(_, prov)| prov.is_empty()) {
        return vec![TEMPLATE_SLIDE_LINE.to_string()];
    }
    entries
        .iter()
        .enumerate()
        .map(|(i, (_, prov))| match prov.path.as_deref().or(prov.name.as_deref()) {
            Some(path) => display_path(Path::new(path), base_dir),
            None => placeholder_line(i + 1),
        })
        .collect()
}

/// Fail on the presentation or the first image that does not exist.
fn check_files<P: AsRef<Path>>(path: &Path, images: &[P]) -> Result<()> {
    if !path.is_file() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    for image in images {
        let image = image.as_ref();
        if !image.is_file() {
            return Err(Error::FileNotFound(image.to_path_buf()));
        }
    }
    Ok(())
}

/// Absolute path and file name of an image.
pub fn provenance_for(image: &Path) -> Provenance {
    let absolute = std::path::absolute(image).unwrap_or_else(|_| image.to_path_buf());
    Provenance::for_image(&absolute)
}

fn stamp_provenance(pres: &mut Presentation, slide_index: usize, shape_id: u32, image: &Path) {
    let provenance = provenance_for(image);
    let result = pres
        .slide_mut(slide_index)
        .and_then(|slide| set_provenance(slide, shape_id, &provenance));
    if let Err(e) = result {
        log::warn!("Could not store metadata for {}: {}", image.display(), e);
    }
}

fn label_slide(pres: &mut Presentation, slide_index: usize, lines: &[String]) {
    let size = pres.slide_size();
    let result = pres
        .slide_mut(slide_index)
        .and_then(|slide| add_label(slide, lines, size));
    if let Err(e) = result {
        log::warn!("Could not add label to slide {}: {}", slide_index, e);
    }
}
