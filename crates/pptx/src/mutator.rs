//! Shape-level edits: duplicate a slide, strip shapes, insert pictures and
//! stamp provenance.

use crate::media::ImageSource;
use crate::presentation::Presentation;
use crate::rels::{rel_type, relative_target, Relationships};
use crate::shapes::{c_nv_pr, c_nv_pr_mut, is_shape, rect_geometry, xfrm_element, ShapeKind, Slide};
use crate::xml::XmlElement;
use deck_core::{Error, Position, Provenance, Result};
use std::path::Path;

/// Relationship types not carried over to a duplicated slide.
const NOT_DUPLICATED: &[&str] = &[rel_type::NOTES_SLIDE, rel_type::COMMENTS];

/// Append a copy of the slide at `source_index` and return the copy's index.
///
/// The copy uses the same layout and keeps every shape in order with its
/// geometry. Notes, comments and animation timing are not copied.
pub fn duplicate_slide(pres: &mut Presentation, source_index: usize) -> Result<usize> {
    let source = pres.slide(source_index)?;
    let source_part = source.part_name().to_string();

    let mut rels = Relationships::new();
    for rel in source
        .relationships()
        .iter()
        .filter(|r| !NOT_DUPLICATED.contains(&r.rel_type.as_str()))
    {
        rels.push(rel.clone());
    }

    let mut xml = source.xml().clone();
    // Timing refers to shape ids of the source slide
    xml.root.remove_children_where(|el| el.local_name() == "timing");

    if let Some(tree) = xml.root.path_mut(&["cSld", "spTree"]) {
        let shapes: Vec<XmlElement> = tree.elements().filter(|el| is_shape(el)).cloned().collect();
        tree.remove_children_where(is_shape);
        for shape in shapes {
            tree.insert_before(shape, "extLst");
        }
    }

    let index = pres.append_slide(&source_part, xml, rels)?;
    log::debug!("Duplicated slide {} as slide {}", source_index, index);
    Ok(index)
}

/// Remove every picture from a slide. Returns the count removed.
pub fn remove_pictures(slide: &mut Slide) -> usize {
    let removed = slide.remove_shapes_where(|kind, _| kind.is_picture());
    log::debug!("Removed {} pictures from {}", removed, slide.part_name());
    removed
}

/// Remove every text-bearing shape, placeholders included. Returns the count removed.
pub fn remove_all_text(slide: &mut Slide) -> usize {
    let removed = slide.remove_shapes_where(|kind, _| kind.is_text());
    log::debug!("Removed {} text shapes from {}", removed, slide.part_name());
    removed
}

/// Remove text boxes that are not bound to a layout placeholder. Returns the count removed.
pub fn remove_free_text_boxes(slide: &mut Slide) -> usize {
    let removed = slide.remove_shapes_where(|kind, _| {
        matches!(kind, ShapeKind::TextShape { is_placeholder: false })
    });
    log::debug!("Removed {} text boxes from {}", removed, slide.part_name());
    removed
}

/// Insert an image as a new picture on top of the slide's shapes.
///
/// Returns the new shape's id.
pub fn insert_picture(
    pres: &mut Presentation,
    slide_index: usize,
    image_path: &Path,
    position: Position,
    provenance: Option<&Provenance>,
) -> Result<u32> {
    pres.slide(slide_index)?;
    let image = ImageSource::load(image_path)?;
    let media_part = pres.add_media(&image)?;

    let slide = pres.slide_mut(slide_index)?;
    let target = relative_target(slide.part_name(), &media_part);
    let r_id = slide
        .relationships_mut()
        .get_or_add(rel_type::IMAGE, &target);

    let prefixes = slide.prefixes();
    let id = slide.next_shape_id();
    let mut c_nv_pr = XmlElement::new(prefixes.p("cNvPr"))
        .with_attr("id", id.to_string())
        .with_attr("name", format!("Picture {}", id - 1));
    if let Some(prov) = provenance {
        apply_provenance(&mut c_nv_pr, prov);
    }

    let pic = XmlElement::new(prefixes.p("pic"))
        .with_child(
            XmlElement::new(prefixes.p("nvPicPr"))
                .with_child(c_nv_pr)
                .with_child(
                    XmlElement::new(prefixes.p("cNvPicPr")).with_child(
                        XmlElement::new(prefixes.a("picLocks")).with_attr("noChangeAspect", "1"),
                    ),
                )
                .with_child(XmlElement::new(prefixes.p("nvPr"))),
        )
        .with_child(
            XmlElement::new(prefixes.p("blipFill"))
                .with_child(XmlElement::new(prefixes.a("blip")).with_attr(prefixes.r("embed"), r_id))
                .with_child(
                    XmlElement::new(prefixes.a("stretch"))
                        .with_child(XmlElement::new(prefixes.a("fillRect"))),
                ),
        )
        .with_child(
            XmlElement::new(prefixes.p("spPr"))
                .with_child(xfrm_element(&prefixes, position.to_emu()))
                .with_child(rect_geometry(&prefixes)),
        );

    slide.append_shape(pic)?;
    log::debug!(
        "Inserted {} as shape {} on slide {}",
        image_path.display(),
        id,
        slide_index
    );
    Ok(id)
}

/// Stamp source path and display name on a picture.
pub fn set_provenance(slide: &mut Slide, shape_id: u32, provenance: &Provenance) -> Result<()> {
    let part = slide.part_name().to_string();
    let shape = slide
        .shape_element_mut(shape_id)
        .ok_or_else(|| Error::InvalidValue(format!("no shape with id {} on {}", shape_id, part)))?;
    let c_nv_pr = c_nv_pr_mut(shape)
        .ok_or_else(|| Error::CorruptedFile(format!("shape {} on {} has no cNvPr", shape_id, part)))?;
    apply_provenance(c_nv_pr, provenance);
    Ok(())
}

fn apply_provenance(c_nv_pr: &mut XmlElement, provenance: &Provenance) {
    if let Some(path) = &provenance.path {
        c_nv_pr.set_attr("descr", path.as_str());
    }
    if let Some(name) = &provenance.name {
        c_nv_pr.set_attr("title", name.as_str());
    }
}

/// Stored provenance of a shape. Shapes that never had any yield an empty pair.
pub fn read_provenance(shape: &XmlElement) -> Provenance {
    match c_nv_pr(shape) {
        Some(c_nv_pr) => Provenance {
            path: c_nv_pr.attr("descr").map(str::to_string),
            name: c_nv_pr.attr("title").map(str::to_string),
        },
        None => Provenance::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_provenance_missing() {
        let shape = XmlElement::new("p:sp").with_child(
            XmlElement::new("p:nvSpPr").with_child(XmlElement::new("p:cNvPr").with_attr("id", "2")),
        );
        assert!(read_provenance(&shape).is_empty());
        assert!(read_provenance(&XmlElement::new("p:grpSp")).is_empty());
    }

    #[test]
    fn test_read_provenance_any_container() {
        let shape = XmlElement::new("p:graphicFrame").with_child(
            XmlElement::new("p:nvGraphicFramePr").with_child(
                XmlElement::new("p:cNvPr")
                    .with_attr("id", "3")
                    .with_attr("descr", "/data/chart.png")
                    .with_attr("title", "chart.png"),
            ),
        );
        let prov = read_provenance(&shape);
        assert_eq!(prov.path.as_deref(), Some("/data/chart.png"));
        assert_eq!(prov.name.as_deref(), Some("chart.png"));
    }

    #[test]
    fn test_apply_provenance_overwrites() {
        let mut c_nv_pr = XmlElement::new("p:cNvPr")
            .with_attr("id", "4")
            .with_attr("descr", "old");
        apply_provenance(
            &mut c_nv_pr,
            &Provenance {
                path: Some("/new/a.png".into()),
                name: Some("a.png".into()),
            },
        );
        assert_eq!(c_nv_pr.attr("descr"), Some("/new/a.png"));
        assert_eq!(c_nv_pr.attr("title"), Some("a.png"));
        assert_eq!(c_nv_pr.attributes.len(), 3);
    }
}
