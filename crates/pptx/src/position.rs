//! Picture geometry on slides, in reading order.

use crate::presentation::Presentation;
use crate::shapes::Shape;
use crate::xml::XmlDocument;
use deck_core::geometry::sort_reading_order;
use deck_core::{EmuRect, Error, Position, Result};
use std::path::Path;

/// Geometry of the `picture_index`-th picture on a slide, in document order.
pub fn get_position(pres: &Presentation, slide_index: usize, picture_index: usize) -> Result<Position> {
    let rects = picture_rects(pres, slide_index)?;
    if rects.is_empty() {
        return Err(Error::NoPictures { slide: slide_index });
    }
    rects
        .get(picture_index)
        .map(EmuRect::to_position)
        .ok_or(Error::IndexOutOfRange {
            what: "Picture",
            index: picture_index,
            len: rects.len(),
        })
}

/// Geometry of every picture on a slide, sorted into reading order.
///
/// Rows are formed by rounding `top` to the nearest tenth of an inch, so
/// pictures a few pixels apart vertically still read left to right.
pub fn get_all_positions(pres: &Presentation, slide_index: usize) -> Result<Vec<Position>> {
    let mut positions: Vec<Position> = picture_rects(pres, slide_index)?
        .iter()
        .map(EmuRect::to_position)
        .collect();
    sort_reading_order(&mut positions);
    Ok(positions)
}

/// [`get_position`] on a file.
pub fn image_position(path: &Path, slide_index: usize, picture_index: usize) -> Result<Position> {
    let pres = Presentation::open(path)?;
    get_position(&pres, slide_index, picture_index)
}

/// [`get_all_positions`] on a file.
pub fn all_image_positions(path: &Path, slide_index: usize) -> Result<Vec<Position>> {
    let pres = Presentation::open(path)?;
    get_all_positions(&pres, slide_index)
}

/// Stored geometry of every picture on a slide, in document order.
pub(crate) fn picture_rects(pres: &Presentation, slide_index: usize) -> Result<Vec<EmuRect>> {
    let slide = pres.slide(slide_index)?;
    let pictures = slide.pictures();
    if pictures.is_empty() {
        return Ok(Vec::new());
    }

    // Only placeholder pictures without their own transform need the layout
    let layout = if pictures.iter().any(|p| p.xfrm().is_none()) {
        pres.layout_xml(slide_index)?
    } else {
        None
    };

    Ok(pictures
        .iter()
        .map(|pic| picture_rect(pic, layout.as_ref()))
        .collect())
}

/// A picture's own transform, else the matching layout placeholder's, else zero.
pub fn picture_rect(picture: &Shape<'_>, layout: Option<&XmlDocument>) -> EmuRect {
    if let Some(rect) = picture.xfrm() {
        return rect;
    }
    let inherited = picture.placeholder().and_then(|ph| {
        let tree = layout?.root.path(&["cSld", "spTree"])?;
        tree.elements()
            .map(Shape::new)
            .find(|shape| shape.placeholder().is_some_and(|lp| ph.matches(&lp)))
            .and_then(|shape| shape.xfrm())
    });
    inherited.unwrap_or_default()
}
