//! Presentation model: the slide list, slide parts and media store.

use crate::media::ImageSource;
use crate::package::{ContentTypes, Package, SLIDE_CONTENT_TYPE};
use crate::rels::{rel_type, relative_target, resolve_target, Relationships};
use crate::shapes::Slide;
use crate::xml::{ns, qname, XmlDocument, XmlElement};
use deck_core::{Error, Result, SlideSize};
use std::collections::HashSet;
use std::path::Path;

/// Lowest slide ID PowerPoint accepts.
const MIN_SLIDE_ID: u32 = 256;

/// An opened `.pptx` held in memory until [`Presentation::save`].
#[derive(Debug, Clone)]
pub struct Presentation {
    package: Package,
    part_name: String,
    xml: XmlDocument,
    rels: Relationships,
    content_types: ContentTypes,
    slides: Vec<Slide>,
    /// Parts reachable when the package was loaded or last saved.
    reachable: HashSet<String>,
}

impl Presentation {
    /// Open a presentation file.
    pub fn open(path: &Path) -> Result<Self> {
        log::debug!("Opening presentation {}", path.display());
        let package = Package::open(path)?;
        Self::from_package(package)
    }

    /// Build the model over a loaded package.
    pub fn from_package(package: Package) -> Result<Self> {
        let part_name = package.main_document_part()?;
        let xml = package.part_xml(&part_name)?;
        let rels = package.relationships(&part_name)?;
        let content_types = package.content_types()?;

        let r_id_attr = xml
            .prefix_for(ns::RELATIONSHIPS)
            .map(|prefix| qname(&prefix, "id"));

        let mut slides = Vec::new();
        if let Some(list) = xml.root.child("sldIdLst") {
            for entry in list.elements().filter(|el| el.local_name() == "sldId") {
                let sld_id = entry
                    .attr_exact("id")
                    .and_then(|v| v.parse::<u32>().ok())
                    .ok_or_else(|| Error::CorruptedFile("slide entry without an id".into()))?;
                let r_id = r_id_attr
                    .as_deref()
                    .and_then(|attr| entry.attr_exact(attr))
                    .ok_or_else(|| {
                        Error::CorruptedFile(format!("slide {} has no relationship id", sld_id))
                    })?;
                let rel = rels.get(r_id).ok_or_else(|| {
                    Error::CorruptedFile(format!("slide relationship {} is missing", r_id))
                })?;

                let slide_part = resolve_target(&part_name, &rel.target);
                let slide_xml = package.part_xml(&slide_part)?;
                let slide_rels = package.relationships(&slide_part)?;
                slides.push(Slide::new(
                    slide_part,
                    slide_xml,
                    slide_rels,
                    sld_id,
                    r_id.to_string(),
                ));
            }
        }

        let reachable = package.reachable_parts()?;
        log::debug!("Loaded {} slides from {}", slides.len(), part_name);

        Ok(Self {
            package,
            part_name,
            xml,
            rels,
            content_types,
            slides,
            reachable,
        })
    }

    /// Write every change back to the package and persist it to `path`.
    ///
    /// Parts that were reachable before but no longer are (a deleted slide,
    /// its notes, media only it used) are dropped.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.flush()?;
        let dropped = self.package.prune_unreachable(&self.reachable)?;
        if !dropped.is_empty() {
            log::debug!("Dropped {} unreferenced parts", dropped.len());
            self.content_types = self.package.content_types()?;
        }
        self.package.save(path)?;
        self.reachable = self.package.reachable_parts()?;
        log::info!("Saved {}", path.display());
        Ok(())
    }

    /// Serialize the in-memory model into package parts.
    fn flush(&mut self) -> Result<()> {
        for slide in self.slides.iter_mut().filter(|s| s.dirty) {
            self.package
                .set_part(slide.part_name(), slide.xml().to_bytes()?);
            self.package
                .set_relationships(slide.part_name(), slide.relationships())?;
            slide.dirty = false;
        }
        self.package.set_part(&self.part_name, self.xml.to_bytes()?);
        self.package.set_relationships(&self.part_name, &self.rels)?;
        self.package.set_content_types(&self.content_types)?;
        Ok(())
    }

    /// The underlying package.
    pub fn package(&self) -> &Package {
        &self.package
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Slides in presentation order.
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide(&self, index: usize) -> Result<&Slide> {
        let len = self.slides.len();
        self.slides
            .get(index)
            .ok_or_else(|| Error::slide_index(index, len))
    }

    pub fn slide_mut(&mut self, index: usize) -> Result<&mut Slide> {
        let len = self.slides.len();
        self.slides
            .get_mut(index)
            .ok_or_else(|| Error::slide_index(index, len))
    }

    /// Slide dimensions from `p:sldSz`, 10" x 7.5" when absent.
    pub fn slide_size(&self) -> SlideSize {
        let default = SlideSize::default();
        match self.xml.root.child("sldSz") {
            Some(size) => SlideSize {
                cx: size.attr_i64("cx").unwrap_or(default.cx),
                cy: size.attr_i64("cy").unwrap_or(default.cy),
            },
            None => default,
        }
    }

    /// Parsed layout part of a slide, if it has one.
    pub fn layout_xml(&self, index: usize) -> Result<Option<XmlDocument>> {
        let slide = self.slide(index)?;
        match slide.layout_part() {
            Some(part) if self.package.contains(&part) => self.package.part_xml(&part).map(Some),
            _ => Ok(None),
        }
    }

    /// Append a slide part next to `sibling_part` and register it at the end
    /// of the slide list. Returns the new slide's index.
    pub(crate) fn append_slide(
        &mut self,
        sibling_part: &str,
        xml: XmlDocument,
        rels: Relationships,
    ) -> Result<usize> {
        let dir = sibling_part
            .rsplit_once('/')
            .map(|(dir, _)| dir.to_string())
            .unwrap_or_default();
        let slide_part = self.next_slide_part(&dir);

        let sld_id = self
            .slides
            .iter()
            .map(|s| s.slide_id())
            .max()
            .map_or(MIN_SLIDE_ID, |max| (max + 1).max(MIN_SLIDE_ID));
        let r_id = self
            .rels
            .add(rel_type::SLIDE, &relative_target(&self.part_name, &slide_part));

        let p = self
            .xml
            .prefix_for(ns::PRESENTATION)
            .unwrap_or_else(|| "p".into());
        let r = self.xml.ensure_namespace("r", ns::RELATIONSHIPS);
        let entry = XmlElement::new(qname(&p, "sldId"))
            .with_attr("id", sld_id.to_string())
            .with_attr(qname(&r, "id"), r_id.as_str());

        match self.xml.root.child_mut("sldIdLst") {
            Some(list) => list.push(entry),
            None => self
                .xml
                .root
                .insert_before(XmlElement::new(qname(&p, "sldIdLst")).with_child(entry), "sldSz"),
        }

        self.content_types
            .set_override(&slide_part, SLIDE_CONTENT_TYPE);

        log::debug!("Appended {} as slide id {} ({})", slide_part, sld_id, r_id);
        let mut slide = Slide::new(slide_part, xml, rels, sld_id, r_id);
        slide.dirty = true;
        self.slides.push(slide);
        Ok(self.slides.len() - 1)
    }

    fn next_slide_part(&self, dir: &str) -> String {
        let prefix = if dir.is_empty() {
            "slide".to_string()
        } else {
            format!("{}/slide", dir)
        };
        let highest = self
            .package
            .part_names()
            .chain(self.slides.iter().map(|s| s.part_name()))
            .filter_map(|name| {
                name.strip_prefix(&prefix)?
                    .strip_suffix(".xml")?
                    .parse::<u32>()
                    .ok()
            })
            .max()
            .unwrap_or(0);
        format!("{}{}.xml", prefix, highest + 1)
    }

    /// Remove a slide from the slide list and drop its relationship.
    ///
    /// Section and custom-show references to the slide go with it. The slide
    /// part itself is dropped on the next save once nothing reaches it.
    pub fn delete_slide(&mut self, index: usize) -> Result<()> {
        let len = self.slides.len();
        if index >= len {
            return Err(Error::slide_index(index, len));
        }
        let slide = self.slides.remove(index);
        let sld_id = slide.slide_id().to_string();
        let r_id = slide.relationship_id().to_string();

        let mut matches = |el: &XmlElement| match el.local_name() {
            // p:sldIdLst entries and p14 section entries
            "sldId" => el.attr_exact("id") == Some(sld_id.as_str()),
            // custom show entries
            "sld" => el.attr("id") == Some(r_id.as_str()),
            _ => false,
        };
        let removed = self.xml.root.remove_descendants_where(&mut matches);
        self.rels.remove(&r_id);

        log::debug!(
            "Deleted slide {} ({}, {} references removed)",
            index,
            slide.part_name(),
            removed
        );
        Ok(())
    }

    /// Store image bytes as a media part, reusing an identical existing one.
    /// Returns the media part name.
    pub(crate) fn add_media(&mut self, image: &ImageSource) -> Result<String> {
        let media_dir = match self.part_name.rsplit_once('/') {
            Some((dir, _)) => format!("{}/media/", dir),
            None => "media/".to_string(),
        };

        if let Some(existing) = self
            .package
            .part_names()
            .filter(|name| name.starts_with(&media_dir))
            .find(|name| self.package.part(name) == Some(image.data.as_slice()))
        {
            let existing = existing.to_string();
            log::debug!("Reusing media part {}", existing);
            return Ok(existing);
        }

        let highest = self
            .package
            .part_names()
            .filter_map(|name| {
                let stem = name.strip_prefix(&media_dir)?.strip_prefix("image")?;
                let digits: String = stem.chars().take_while(|c| c.is_ascii_digit()).collect();
                digits.parse::<u32>().ok()
            })
            .max()
            .unwrap_or(0);
        let name = format!("{}image{}.{}", media_dir, highest + 1, image.kind.extension());

        self.package.set_part(&name, image.data.clone());
        self.content_types
            .ensure_default(image.kind.extension(), image.kind.content_type());
        log::debug!("Added media part {}", name);
        Ok(name)
    }
}
