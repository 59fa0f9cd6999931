//! Test fixtures: small but structurally complete decks written with `zip`,
//! and PNG files written with `image`.

#![allow(dead_code)]

use deck_core::Position;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const GROUP_PROPS: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#;

/// Geometry of the picture placeholder on the fixture layout.
pub const LAYOUT_PICTURE: Position = Position {
    left: 1.0,
    top: 1.5,
    width: 4.0,
    height: 3.0,
};

/// One shape on a fixture slide.
#[derive(Debug, Clone)]
pub enum Item {
    /// Title placeholder with text.
    Title(String),
    /// Picture with its own transform.
    Picture(Position),
    /// Picture placeholder that takes its geometry from the layout.
    LayoutPicture,
    /// Empty picture placeholder: an autoshape with no text body.
    EmptyPicturePlaceholder,
    /// Free text box.
    TextBox(String, Position),
    /// Connector line.
    Line,
}

/// Contents of one fixture slide.
#[derive(Debug, Clone, Default)]
pub struct SlideSpec {
    pub items: Vec<Item>,
    pub notes: bool,
}

impl SlideSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, text: &str) -> Self {
        self.items.push(Item::Title(text.to_string()));
        self
    }

    pub fn picture(mut self, position: Position) -> Self {
        self.items.push(Item::Picture(position));
        self
    }

    pub fn layout_picture(mut self) -> Self {
        self.items.push(Item::LayoutPicture);
        self
    }

    pub fn empty_picture_placeholder(mut self) -> Self {
        self.items.push(Item::EmptyPicturePlaceholder);
        self
    }

    pub fn text_box(mut self, text: &str, position: Position) -> Self {
        self.items.push(Item::TextBox(text.to_string(), position));
        self
    }

    pub fn line(mut self) -> Self {
        self.items.push(Item::Line);
        self
    }

    pub fn with_notes(mut self) -> Self {
        self.notes = true;
        self
    }

    fn has_pictures(&self) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item, Item::Picture(_) | Item::LayoutPicture))
    }
}

/// Write a deck with one slide per spec and return its path.
pub fn write_deck(dir: &Path, name: &str, slides: &[SlideSpec]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, deck_bytes(slides)).unwrap();
    path
}

/// Title slide, a one-picture template and `extra` slides of earlier output.
pub fn standard_deck(dir: &Path, template_picture: Position, extra: usize) -> PathBuf {
    let mut slides = vec![
        SlideSpec::new().title("Results"),
        SlideSpec::new()
            .title("Template")
            .picture(template_picture)
            .text_box("old label", Position::new(5.0, 7.0, 4.9, 0.3)),
    ];
    for i in 0..extra {
        slides.push(
            SlideSpec::new()
                .title(&format!("Old {}", i))
                .picture(template_picture),
        );
    }
    write_deck(dir, "deck.pptx", &slides)
}

/// Write a solid-color PNG and return its path.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32, shade: u8) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::from_pixel(width, height, image::Rgb([shade, 255 - shade, 128]))
        .save(&path)
        .unwrap();
    path
}

fn png_bytes(shade: u8) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    image::RgbImage::from_pixel(4, 4, image::Rgb([shade, 0, 0]))
        .write_to(&mut cursor, image::ImageFormat::Png)
        .unwrap();
    cursor.into_inner()
}

fn emu(position: &Position) -> String {
    let rect = position.to_emu();
    format!(
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        rect.x, rect.y, rect.cx, rect.cy
    )
}

fn shape_xml(item: &Item, id: usize) -> String {
    match item {
        Item::Title(text) => format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Title {n}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US"/><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp>"#,
            n = id - 1
        ),
        Item::Picture(position) => format!(
            r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Picture {n}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rId2"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr>{xfrm}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
            n = id - 1,
            xfrm = emu(position)
        ),
        Item::LayoutPicture => format!(
            r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Picture Placeholder {n}"/><p:cNvPicPr><a:picLocks noGrp="1" noChangeAspect="1"/></p:cNvPicPr><p:nvPr><p:ph type="pic" idx="13"/></p:nvPr></p:nvPicPr><p:blipFill><a:blip r:embed="rId2"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr/></p:pic>"#,
            n = id - 1
        ),
        Item::EmptyPicturePlaceholder => format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Picture Placeholder {n}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="pic" idx="13"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp>"#,
            n = id - 1
        ),
        Item::TextBox(text, position) => format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="TextBox {n}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr>{xfrm}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr><p:txBody><a:bodyPr wrap="square"/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US"/><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp>"#,
            n = id - 1,
            xfrm = emu(position)
        ),
        Item::Line => format!(
            r#"<p:cxnSp><p:nvCxnSpPr><p:cNvPr id="{id}" name="Connector {n}"/><p:cNvCxnSpPr/><p:nvPr/></p:nvCxnSpPr><p:spPr><a:xfrm><a:off x="0" y="6400800"/><a:ext cx="9144000" cy="0"/></a:xfrm><a:prstGeom prst="line"><a:avLst/></a:prstGeom></p:spPr></p:cxnSp>"#,
            n = id - 1
        ),
    }
}

fn slide_xml(spec: &SlideSpec) -> String {
    let shapes: String = spec
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| shape_xml(item, i + 2))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld {NS}><p:cSld><p:spTree>{GROUP_PROPS}{shapes}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr><p:timing><p:tnLst><p:par><p:cTn id="1" dur="indefinite" restart="never" nodeType="tmRoot"/></p:par></p:tnLst></p:timing></p:sld>"#
    )
}

fn rels_xml(entries: &[(String, String, String)]) -> String {
    let body: String = entries
        .iter()
        .map(|(id, kind, target)| {
            format!(r#"<Relationship Id="{id}" Type="{REL}/{kind}" Target="{target}"/>"#)
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{RELS_NS}">{body}</Relationships>"#
    )
}

fn rel(id: &str, kind: &str, target: &str) -> (String, String, String) {
    (id.to_string(), kind.to_string(), target.to_string())
}

/// Serialize a deck to `.pptx` bytes.
pub fn deck_bytes(slides: &[SlideSpec]) -> Vec<u8> {
    let mut parts: Vec<(String, Vec<u8>)> = Vec::new();
    let mut overrides: Vec<(String, String)> = [
        (
            "/ppt/presentation.xml",
            "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml",
        ),
        (
            "/ppt/slideMasters/slideMaster1.xml",
            "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml",
        ),
        (
            "/ppt/slideLayouts/slideLayout1.xml",
            "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml",
        ),
    ]
    .iter()
    .map(|(name, ct)| (name.to_string(), ct.to_string()))
    .collect();

    parts.push((
        "_rels/.rels".into(),
        rels_xml(&[rel("rId1", "officeDocument", "ppt/presentation.xml")]).into_bytes(),
    ));

    let mut pres_rels = vec![rel("rId1", "slideMaster", "slideMasters/slideMaster1.xml")];
    let mut sld_ids = String::new();
    for (i, spec) in slides.iter().enumerate() {
        let n = i + 1;
        let r_id = format!("rId{}", i + 2);
        sld_ids.push_str(&format!(r#"<p:sldId id="{}" r:id="{}"/>"#, 256 + i, r_id));
        pres_rels.push(rel(&r_id, "slide", &format!("slides/slide{}.xml", n)));

        let mut slide_rels = vec![rel("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml")];
        if spec.has_pictures() {
            slide_rels.push(rel("rId2", "image", &format!("../media/image{}.png", n)));
            parts.push((format!("ppt/media/image{}.png", n), png_bytes((n * 37 % 256) as u8)));
        }
        if spec.notes {
            slide_rels.push(rel("rId3", "notesSlide", &format!("../notesSlides/notesSlide{}.xml", n)));
            parts.push((
                format!("ppt/notesSlides/notesSlide{}.xml", n),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:notes {NS}><p:cSld><p:spTree>{GROUP_PROPS}</p:spTree></p:cSld></p:notes>"#
                )
                .into_bytes(),
            ));
            parts.push((
                format!("ppt/notesSlides/_rels/notesSlide{}.xml.rels", n),
                rels_xml(&[rel("rId1", "slide", &format!("../slides/slide{}.xml", n))]).into_bytes(),
            ));
            overrides.push((
                format!("/ppt/notesSlides/notesSlide{}.xml", n),
                "application/vnd.openxmlformats-officedocument.presentationml.notesSlide+xml".to_string(),
            ));
        }

        parts.push((format!("ppt/slides/slide{}.xml", n), slide_xml(spec).into_bytes()));
        parts.push((
            format!("ppt/slides/_rels/slide{}.xml.rels", n),
            rels_xml(&slide_rels).into_bytes(),
        ));
        overrides.push((
            format!("/ppt/slides/slide{}.xml", n),
            "application/vnd.openxmlformats-officedocument.presentationml.slide+xml".to_string(),
        ));
    }

    parts.push((
        "ppt/presentation.xml".into(),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation {NS} saveSubsetFonts="1"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{sld_ids}</p:sldIdLst><p:sldSz cx="9144000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#
        )
        .into_bytes(),
    ));
    parts.push((
        "ppt/_rels/presentation.xml.rels".into(),
        rels_xml(&pres_rels).into_bytes(),
    ));

    parts.push((
        "ppt/slideMasters/slideMaster1.xml".into(),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldMaster {NS}><p:cSld><p:spTree>{GROUP_PROPS}</p:spTree></p:cSld><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#
        )
        .into_bytes(),
    ));
    parts.push((
        "ppt/slideMasters/_rels/slideMaster1.xml.rels".into(),
        rels_xml(&[rel("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml")]).into_bytes(),
    ));

    let layout_picture = emu(&LAYOUT_PICTURE);
    parts.push((
        "ppt/slideLayouts/slideLayout1.xml".into(),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout {NS} type="picTx"><p:cSld name="Picture with Caption"><p:spTree>{GROUP_PROPS}<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="457200" y="274638"/><a:ext cx="8229600" cy="1143000"/></a:xfrm></p:spPr></p:sp><p:sp><p:nvSpPr><p:cNvPr id="3" name="Picture Placeholder 2"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="pic" idx="13"/></p:nvPr></p:nvSpPr><p:spPr>{layout_picture}</p:spPr></p:sp></p:spTree></p:cSld></p:sldLayout>"#
        )
        .into_bytes(),
    ));
    parts.push((
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels".into(),
        rels_xml(&[rel("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]).into_bytes(),
    ));

    let override_xml: String = overrides
        .iter()
        .map(|(name, ct)| format!(r#"<Override PartName="{name}" ContentType="{ct}"/>"#))
        .collect();
    let content_types = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/>{override_xml}</Types>"#
    );

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut cursor);
        let options = FileOptions::default();
        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(content_types.as_bytes()).unwrap();
        for (name, data) in &parts {
            zip.start_file(name.as_str(), options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }
    cursor.into_inner()
}
