//! The visible provenance label: a right-aligned text box in the
//! bottom-right corner listing image paths.

use crate::shapes::{rect_geometry, xfrm_element, Slide};
use crate::xml::XmlElement;
use deck_core::label::{
    label_position, LABEL_FONT_NAME, LABEL_FONT_SIZE, LABEL_SHAPE_NAME,
};
use deck_core::{Result, SlideSize};

/// Add a label with one paragraph per line. Returns the new shape's id.
pub fn add_label(slide: &mut Slide, lines: &[String], size: SlideSize) -> Result<u32> {
    let prefixes = slide.prefixes();
    let id = slide.next_shape_id();
    let rect = label_position(size, lines.len()).to_emu();

    let mut body = XmlElement::new(prefixes.p("txBody"))
        .with_child(
            XmlElement::new(prefixes.a("bodyPr"))
                .with_attr("wrap", "square")
                .with_attr("rtlCol", "0"),
        )
        .with_child(XmlElement::new(prefixes.a("lstStyle")));

    for line in lines {
        body.push(
            XmlElement::new(prefixes.a("p"))
                .with_child(XmlElement::new(prefixes.a("pPr")).with_attr("algn", "r"))
                .with_child(
                    XmlElement::new(prefixes.a("r"))
                        .with_child(
                            XmlElement::new(prefixes.a("rPr"))
                                .with_attr("lang", "en-US")
                                .with_attr("sz", (LABEL_FONT_SIZE * 100).to_string())
                                .with_attr("dirty", "0")
                                .with_child(
                                    XmlElement::new(prefixes.a("latin"))
                                        .with_attr("typeface", LABEL_FONT_NAME),
                                ),
                        )
                        .with_child(XmlElement::new(prefixes.a("t")).with_text(line.as_str())),
                ),
        );
    }

    let shape = XmlElement::new(prefixes.p("sp"))
        .with_child(
            XmlElement::new(prefixes.p("nvSpPr"))
                .with_child(
                    XmlElement::new(prefixes.p("cNvPr"))
                        .with_attr("id", id.to_string())
                        .with_attr("name", LABEL_SHAPE_NAME),
                )
                .with_child(XmlElement::new(prefixes.p("cNvSpPr")).with_attr("txBox", "1"))
                .with_child(XmlElement::new(prefixes.p("nvPr"))),
        )
        .with_child(
            XmlElement::new(prefixes.p("spPr"))
                .with_child(xfrm_element(&prefixes, rect))
                .with_child(rect_geometry(&prefixes))
                .with_child(XmlElement::new(prefixes.a("noFill"))),
        )
        .with_child(body);

    slide.append_shape(shape)?;
    log::debug!("Added {}-line label to {}", lines.len(), slide.part_name());
    Ok(id)
}

/// Remove labels added earlier. Returns the count removed.
pub fn remove_labels(slide: &mut Slide) -> usize {
    slide.remove_shapes_where(|kind, el| {
        kind.is_text()
            && crate::shapes::c_nv_pr(el).and_then(|c| c.attr("name")) == Some(LABEL_SHAPE_NAME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rels::Relationships;
    use crate::shapes::ShapeKind;
    use crate::xml::XmlDocument;
    use deck_core::Position;

    fn blank() -> Slide {
        let xml = XmlDocument::parse_str(
            r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld></p:sld>"#,
        )
        .unwrap();
        Slide::new("ppt/slides/slide1.xml".into(), xml, Relationships::new(), 256, "rId2".into())
    }

    #[test]
    fn test_label_shape() {
        let mut slide = blank();
        let lines = vec!["plots/a.png".to_string(), "plots/b.png".to_string()];
        let id = add_label(&mut slide, &lines, SlideSize::default()).unwrap();
        assert_eq!(id, 2);

        let shape = slide.shape_by_id(id).unwrap();
        assert_eq!(shape.kind(), ShapeKind::TextShape { is_placeholder: false });
        assert_eq!(shape.name(), Some(LABEL_SHAPE_NAME));
        assert_eq!(shape.text(), "plots/a.png\nplots/b.png");

        let pos = shape.xfrm().unwrap().to_position();
        assert!(pos.approx_eq(&Position::new(4.9, 6.94, 5.0, 0.46), 1e-6));
    }

    #[test]
    fn test_remove_labels_keeps_other_text() {
        let mut slide = blank();
        add_label(&mut slide, &["x.png".to_string()], SlideSize::default()).unwrap();
        let body = XmlElement::new("p:sp")
            .with_child(
                XmlElement::new("p:nvSpPr")
                    .with_child(XmlElement::new("p:cNvPr").with_attr("id", "9").with_attr("name", "Note")),
            )
            .with_child(XmlElement::new("p:txBody"));
        slide.append_shape(body).unwrap();

        assert_eq!(remove_labels(&mut slide), 1);
        assert_eq!(slide.shapes().len(), 1);
        assert_eq!(slide.shapes()[0].name(), Some("Note"));
    }
}
