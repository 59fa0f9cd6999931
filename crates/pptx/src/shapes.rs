//! Slide shapes: the shape tree, shape classification and geometry.

use crate::rels::{rel_type, resolve_target, Relationships};
use crate::xml::{ns, XmlDocument, XmlElement};
use deck_core::{EmuRect, Error, Provenance, Result};

/// Shape-tree children that are group properties, not shapes.
const TREE_PROPERTIES: &[&str] = &["nvGrpSpPr", "grpSpPr", "extLst"];

/// What a shape is, decided once when it is wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// `p:pic`
    Picture,
    /// `p:sp`. Every autoshape can hold a text frame, even one stored
    /// without a `txBody`. Placeholders are bound to the layout.
    TextShape { is_placeholder: bool },
    /// Groups, graphic frames, connectors, ...
    Other,
}

impl ShapeKind {
    /// Classify a shape-tree child.
    pub fn classify(el: &XmlElement) -> Self {
        match el.local_name() {
            "pic" => Self::Picture,
            "sp" => Self::TextShape {
                is_placeholder: placeholder_element(el).is_some(),
            },
            _ => Self::Other,
        }
    }

    pub fn is_picture(&self) -> bool {
        matches!(self, Self::Picture)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::TextShape { .. })
    }
}

/// Layout binding of a placeholder shape (`p:ph`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderRef {
    pub ph_type: Option<String>,
    pub idx: Option<String>,
}

impl PlaceholderRef {
    /// Whether a layout placeholder is the one this shape inherits from.
    pub fn matches(&self, other: &PlaceholderRef) -> bool {
        match (&self.idx, &other.idx) {
            (Some(a), Some(b)) => a == b,
            _ => self.effective_type() == other.effective_type(),
        }
    }

    fn effective_type(&self) -> &str {
        // An untyped placeholder is an object placeholder
        self.ph_type.as_deref().unwrap_or("obj")
    }

    /// Title or centered-title placeholder.
    pub fn is_title(&self) -> bool {
        matches!(self.ph_type.as_deref(), Some("title") | Some("ctrTitle"))
    }
}

/// A read-only view of one shape on a slide.
#[derive(Debug, Clone, Copy)]
pub struct Shape<'a> {
    element: &'a XmlElement,
    kind: ShapeKind,
}

impl<'a> Shape<'a> {
    /// Wrap a shape-tree child.
    pub fn new(element: &'a XmlElement) -> Self {
        Self {
            element,
            kind: ShapeKind::classify(element),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn element(&self) -> &'a XmlElement {
        self.element
    }

    /// `cNvPr@id`.
    pub fn id(&self) -> Option<u32> {
        c_nv_pr(self.element)
            .and_then(|el| el.attr("id"))
            .and_then(|v| v.parse().ok())
    }

    /// `cNvPr@name`.
    pub fn name(&self) -> Option<&'a str> {
        c_nv_pr(self.element).and_then(|el| el.attr("name"))
    }

    /// Layout binding, if this shape is a placeholder.
    pub fn placeholder(&self) -> Option<PlaceholderRef> {
        placeholder_element(self.element).map(|ph| PlaceholderRef {
            ph_type: ph.attr("type").map(str::to_string),
            idx: ph.attr("idx").map(str::to_string),
        })
    }

    /// Geometry stored on the shape itself.
    pub fn xfrm(&self) -> Option<EmuRect> {
        shape_xfrm(self.element)
    }

    /// Stored provenance pair (empty when never stamped).
    pub fn provenance(&self) -> Provenance {
        crate::mutator::read_provenance(self.element)
    }

    /// Relationship ID of the embedded picture (`a:blip@r:embed`).
    pub fn embed_id(&self) -> Option<&'a str> {
        self.element
            .path(&["blipFill", "blip"])
            .and_then(|blip| blip.attr("embed"))
    }

    /// Text of the shape's text body, paragraphs joined with newlines.
    pub fn text(&self) -> String {
        self.element
            .child("txBody")
            .map(|body| {
                body.elements()
                    .filter(|el| el.local_name() == "p")
                    .map(|p| p.text())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default()
    }
}

/// A slide part loaded for editing.
#[derive(Debug, Clone)]
pub struct Slide {
    part_name: String,
    xml: XmlDocument,
    rels: Relationships,
    sld_id: u32,
    r_id: String,
    pub(crate) dirty: bool,
}

/// Prefixes bound on a slide for the namespaces new shapes use.
#[derive(Debug, Clone)]
pub struct Prefixes {
    pub p: String,
    pub a: String,
    pub r: String,
}

impl Prefixes {
    pub fn p(&self, local: &str) -> String {
        crate::xml::qname(&self.p, local)
    }

    pub fn a(&self, local: &str) -> String {
        crate::xml::qname(&self.a, local)
    }

    pub fn r(&self, local: &str) -> String {
        crate::xml::qname(&self.r, local)
    }
}

impl Slide {
    pub(crate) fn new(
        part_name: String,
        xml: XmlDocument,
        rels: Relationships,
        sld_id: u32,
        r_id: String,
    ) -> Self {
        Self {
            part_name,
            xml,
            rels,
            sld_id,
            r_id,
            dirty: false,
        }
    }

    /// Part name, e.g. `ppt/slides/slide3.xml`.
    pub fn part_name(&self) -> &str {
        &self.part_name
    }

    /// Slide ID from `p:sldIdLst`.
    pub fn slide_id(&self) -> u32 {
        self.sld_id
    }

    /// Relationship ID of this slide in the presentation part.
    pub fn relationship_id(&self) -> &str {
        &self.r_id
    }

    pub fn xml(&self) -> &XmlDocument {
        &self.xml
    }

    pub fn relationships(&self) -> &Relationships {
        &self.rels
    }

    pub(crate) fn relationships_mut(&mut self) -> &mut Relationships {
        self.dirty = true;
        &mut self.rels
    }

    /// Part name of the slide layout this slide was created from.
    pub fn layout_part(&self) -> Option<String> {
        self.rels
            .first_of_type(rel_type::SLIDE_LAYOUT)
            .map(|rel| resolve_target(&self.part_name, &rel.target))
    }

    /// `p:cSld/p:spTree`.
    pub fn shape_tree(&self) -> Option<&XmlElement> {
        self.xml.root.path(&["cSld", "spTree"])
    }

    pub(crate) fn shape_tree_mut(&mut self) -> Option<&mut XmlElement> {
        self.dirty = true;
        self.xml.root.path_mut(&["cSld", "spTree"])
    }

    /// Shapes in z-order.
    pub fn shapes(&self) -> Vec<Shape<'_>> {
        self.shape_tree()
            .map(|tree| tree.elements().filter(|el| is_shape(el)).map(Shape::new).collect())
            .unwrap_or_default()
    }

    /// Picture shapes in document order.
    pub fn pictures(&self) -> Vec<Shape<'_>> {
        self.shapes()
            .into_iter()
            .filter(|s| s.kind().is_picture())
            .collect()
    }

    /// Find a shape by `cNvPr@id`.
    pub fn shape_by_id(&self, id: u32) -> Option<Shape<'_>> {
        self.shapes().into_iter().find(|s| s.id() == Some(id))
    }

    /// One more than the largest shape ID anywhere on the slide.
    pub fn next_shape_id(&self) -> u32 {
        self.xml
            .root
            .descendants()
            .into_iter()
            .filter(|el| el.local_name() == "cNvPr")
            .filter_map(|el| el.attr("id").and_then(|v| v.parse::<u32>().ok()))
            .max()
            .unwrap_or(1)
            + 1
    }

    /// Namespace prefixes for building shapes, declaring `r` if the slide lacks it.
    pub(crate) fn prefixes(&mut self) -> Prefixes {
        let p = self.xml.prefix_for(ns::PRESENTATION).unwrap_or_else(|| "p".into());
        let a = self.xml.ensure_namespace("a", ns::DRAWING);
        let r = self.xml.ensure_namespace("r", ns::RELATIONSHIPS);
        Prefixes { p, a, r }
    }

    /// Append a shape on top of the z-order (before the tree's `extLst`).
    pub(crate) fn append_shape(&mut self, shape: XmlElement) -> Result<()> {
        let part = self.part_name.clone();
        let tree = self
            .shape_tree_mut()
            .ok_or_else(|| Error::CorruptedFile(format!("{} has no shape tree", part)))?;
        tree.insert_before(shape, "extLst");
        Ok(())
    }

    /// Detach every shape whose kind and element match `pred`. Returns the count.
    ///
    /// A slide whose shape tree cannot be located is left untouched with a warning.
    pub fn remove_shapes_where<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(ShapeKind, &XmlElement) -> bool,
    {
        let part = self.part_name.clone();
        match self.shape_tree_mut() {
            Some(tree) => {
                tree.remove_children_where(|el| is_shape(el) && pred(ShapeKind::classify(el), el))
            }
            None => {
                log::warn!("{}: no shape tree found, nothing removed", part);
                0
            }
        }
    }

    /// Mutable access to a shape element by ID.
    pub(crate) fn shape_element_mut(&mut self, id: u32) -> Option<&mut XmlElement> {
        self.shape_tree_mut()?.elements_mut().find(|el| {
            is_shape(el)
                && c_nv_pr(el)
                    .and_then(|c| c.attr("id"))
                    .and_then(|v| v.parse::<u32>().ok())
                    == Some(id)
        })
    }
}

/// Whether a shape-tree child is a shape rather than group properties.
pub fn is_shape(el: &XmlElement) -> bool {
    !TREE_PROPERTIES.contains(&el.local_name())
}

/// The non-visual properties container (`p:nvSpPr`, `p:nvPicPr`, `p:nvGrpSpPr`, ...).
pub fn non_visual_container(el: &XmlElement) -> Option<&XmlElement> {
    el.elements().find(|child| {
        let local = child.local_name();
        local.starts_with("nv") && local.ends_with("Pr")
    })
}

/// `cNvPr` of a shape, found by local name under whichever `nv*Pr` it has.
pub fn c_nv_pr(el: &XmlElement) -> Option<&XmlElement> {
    non_visual_container(el).and_then(|nv| nv.child("cNvPr"))
}

/// Mutable variant of [`c_nv_pr`].
pub fn c_nv_pr_mut(el: &mut XmlElement) -> Option<&mut XmlElement> {
    el.elements_mut()
        .find(|child| {
            let local = child.local_name();
            local.starts_with("nv") && local.ends_with("Pr")
        })
        .and_then(|nv| nv.child_mut("cNvPr"))
}

fn placeholder_element(el: &XmlElement) -> Option<&XmlElement> {
    non_visual_container(el)
        .and_then(|nv| nv.child("nvPr"))
        .and_then(|nv_pr| nv_pr.child("ph"))
}

/// Read `a:xfrm` from `spPr` / `grpSpPr`, or a graphic frame's own `p:xfrm`.
pub fn shape_xfrm(el: &XmlElement) -> Option<EmuRect> {
    let xfrm = el
        .child("spPr")
        .or_else(|| el.child("grpSpPr"))
        .and_then(|pr| pr.child("xfrm"))
        .or_else(|| el.child("xfrm"))?;

    let off = xfrm.child("off")?;
    let ext = xfrm.child("ext")?;
    Some(EmuRect {
        x: off.attr_i64("x").unwrap_or(0),
        y: off.attr_i64("y").unwrap_or(0),
        cx: ext.attr_i64("cx").unwrap_or(0),
        cy: ext.attr_i64("cy").unwrap_or(0),
    })
}

/// Build an `a:xfrm` element for a rectangle.
pub(crate) fn xfrm_element(prefixes: &Prefixes, rect: EmuRect) -> XmlElement {
    XmlElement::new(prefixes.a("xfrm"))
        .with_child(
            XmlElement::new(prefixes.a("off"))
                .with_attr("x", rect.x.to_string())
                .with_attr("y", rect.y.to_string()),
        )
        .with_child(
            XmlElement::new(prefixes.a("ext"))
                .with_attr("cx", rect.cx.to_string())
                .with_attr("cy", rect.cy.to_string()),
        )
}

/// Build a rectangle `a:prstGeom`.
pub(crate) fn rect_geometry(prefixes: &Prefixes) -> XmlElement {
    XmlElement::new(prefixes.a("prstGeom"))
        .with_attr("prst", "rect")
        .with_child(XmlElement::new(prefixes.a("avLst")))
}
