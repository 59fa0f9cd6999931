//! Plain picture insertion on an existing slide.

use crate::media::pixel_size;
use crate::mutator::insert_picture;
use crate::presentation::Presentation;
use deck_core::{Error, Position, Result};
use std::path::Path;

/// Insert an image at an explicit position (inches). Returns the new shape's id.
pub fn insert_image(path: &Path, slide_index: usize, image: &Path, position: Position) -> Result<u32> {
    check_files(path, image)?;
    let mut pres = Presentation::open(path)?;
    pres.slide(slide_index)?;

    let id = insert_picture(&mut pres, slide_index, image, position, None)?;
    pres.save(path)?;
    log::info!(
        "Inserted {} into slide {}",
        image.display(),
        slide_index + 1
    );
    Ok(id)
}

/// Insert an image given one dimension; the other follows its pixel aspect ratio.
///
/// Exactly one of `width` and `height` must be given. Returns the position used.
pub fn insert_image_preserve_aspect(
    path: &Path,
    slide_index: usize,
    image: &Path,
    left: f64,
    top: f64,
    width: Option<f64>,
    height: Option<f64>,
) -> Result<Position> {
    if width.is_some() == height.is_some() {
        return Err(Error::InvalidValue(
            "specify exactly one of width or height to preserve aspect ratio".into(),
        ));
    }
    check_files(path, image)?;

    let mut pres = Presentation::open(path)?;
    pres.slide(slide_index)?;

    let (width, height) = fit_aspect(pixel_size(image)?, width, height)?;
    let position = Position::new(left, top, width, height);
    insert_picture(&mut pres, slide_index, image, position, None)?;
    pres.save(path)?;
    log::info!(
        "Inserted {} with preserved aspect ratio ({:.2}\" x {:.2}\")",
        image.display(),
        width,
        height
    );
    Ok(position)
}

/// Complete a width or height from the image's pixel size.
pub fn fit_aspect(pixels: (u32, u32), width: Option<f64>, height: Option<f64>) -> Result<(f64, f64)> {
    let (px_w, px_h) = pixels;
    if px_w == 0 || px_h == 0 {
        return Err(Error::InvalidValue("image has no pixels".into()));
    }
    let ratio = px_h as f64 / px_w as f64;
    match (width, height) {
        (Some(w), None) => Ok((w, w * ratio)),
        (None, Some(h)) => Ok((h / ratio, h)),
        _ => Err(Error::InvalidValue(
            "specify exactly one of width or height to preserve aspect ratio".into(),
        )),
    }
}

fn check_files(path: &Path, image: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    if !image.is_file() {
        return Err(Error::FileNotFound(image.to_path_buf()));
    }
    Ok(())
}
