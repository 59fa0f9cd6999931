//! OPC package: the ZIP container, its content-type table and part graph.

use crate::rels::{rel_type, rels_part_name, resolve_target, Relationships};
use crate::xml::{XmlDocument, XmlElement};
use deck_core::{Error, PresentationFormat, Result};
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Name of the content-type part.
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// Content type of a slide part.
pub const SLIDE_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";

/// One stored part.
#[derive(Debug, Clone)]
struct Part {
    name: String,
    data: Vec<u8>,
}

/// An OOXML package held entirely in memory.
#[derive(Debug, Clone)]
pub struct Package {
    /// Parts in archive order; new parts are appended.
    parts: Vec<Part>,
}

impl Package {
    /// Open a package from disk, rejecting legacy binary presentations.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes).map_err(|e| match e {
            Error::CorruptedFile(msg) => Error::CorruptedFile(format!(
                "Could not open {}: {}. The file may be damaged or saved in the old .ppt format",
                path.display(),
                msg
            )),
            other => other,
        })
    }

    /// Load a package from its ZIP bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        match PresentationFormat::from_magic(&bytes) {
            Some(PresentationFormat::Pptx) => {}
            Some(PresentationFormat::Ppt) => {
                return Err(Error::UnsupportedFormat(
                    "legacy .ppt presentation; save it as .pptx first".into(),
                ))
            }
            None => return Err(Error::CorruptedFile("not a ZIP package".into())),
        }
        Self::from_reader(Cursor::new(bytes))
    }

    /// Load a package from any seekable reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::CorruptedFile(format!("Failed to open ZIP: {}", e)))?;

        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| Error::ZipError(format!("Failed to read entry {}: {}", i, e)))?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)
                .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", name, e)))?;
            parts.push(Part { name, data });
        }

        let package = Self { parts };
        if !package.contains(CONTENT_TYPES_PART) {
            return Err(Error::CorruptedFile(format!("missing {}", CONTENT_TYPES_PART)));
        }
        Ok(package)
    }

    /// Whether a part exists.
    pub fn contains(&self, name: &str) -> bool {
        self.parts.iter().any(|p| p.name == name)
    }

    /// Raw bytes of a part.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.data.as_slice())
    }

    /// Parse a part as XML.
    pub fn part_xml(&self, name: &str) -> Result<XmlDocument> {
        let data = self
            .part(name)
            .ok_or_else(|| Error::CorruptedFile(format!("missing part '{}'", name)))?;
        XmlDocument::parse(data).map_err(|e| Error::XmlError(format!("{}: {}", name, e)))
    }

    /// Add or replace a part.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.parts.iter_mut().find(|p| p.name == name) {
            Some(part) => part.data = data,
            None => self.parts.push(Part {
                name: name.to_string(),
                data,
            }),
        }
    }

    /// Remove a part. Returns whether it existed.
    pub fn remove_part(&mut self, name: &str) -> bool {
        let before = self.parts.len();
        self.parts.retain(|p| p.name != name);
        before != self.parts.len()
    }

    /// Names of all parts, in archive order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.name.as_str())
    }

    /// Relationships whose source is `part` (`""` for the package). Empty when absent.
    pub fn relationships(&self, part: &str) -> Result<Relationships> {
        match self.part(&rels_part_name(part)) {
            Some(data) => Relationships::parse(data),
            None => Ok(Relationships::new()),
        }
    }

    /// Store the relationships of `part`, dropping the `.rels` part when empty.
    pub fn set_relationships(&mut self, part: &str, rels: &Relationships) -> Result<()> {
        let name = rels_part_name(part);
        if rels.is_empty() {
            self.remove_part(&name);
        } else {
            self.set_part(&name, rels.to_bytes()?);
        }
        Ok(())
    }

    /// Part name of the main document (`ppt/presentation.xml` in practice).
    pub fn main_document_part(&self) -> Result<String> {
        let rels = self.relationships("")?;
        let rel = rels
            .first_of_type(rel_type::OFFICE_DOCUMENT)
            .ok_or_else(|| Error::CorruptedFile("package has no main document".into()))?;
        Ok(resolve_target("", &rel.target))
    }

    /// The content-type table.
    pub fn content_types(&self) -> Result<ContentTypes> {
        let data = self
            .part(CONTENT_TYPES_PART)
            .ok_or_else(|| Error::CorruptedFile(format!("missing {}", CONTENT_TYPES_PART)))?;
        ContentTypes::parse(data)
    }

    /// Replace the content-type table.
    pub fn set_content_types(&mut self, types: &ContentTypes) -> Result<()> {
        self.set_part(CONTENT_TYPES_PART, types.to_bytes()?);
        Ok(())
    }

    /// Parts reachable from the package relationships through internal relationships.
    pub fn reachable_parts(&self) -> Result<HashSet<String>> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([String::new()]);

        while let Some(source) = queue.pop_front() {
            for rel in self.relationships(&source)?.iter().filter(|r| !r.external) {
                let target = resolve_target(&source, &rel.target);
                if self.contains(&target) && seen.insert(target.clone()) {
                    queue.push_back(target);
                }
            }
        }

        Ok(seen)
    }

    /// Drop parts from `previously_reachable` that no relationship reaches any more,
    /// along with their `.rels` parts and content-type overrides.
    ///
    /// Parts that were never reachable are left alone.
    pub fn prune_unreachable(&mut self, previously_reachable: &HashSet<String>) -> Result<Vec<String>> {
        let reachable = self.reachable_parts()?;
        let orphans: BTreeSet<String> = previously_reachable
            .iter()
            .filter(|name| !reachable.contains(*name) && self.contains(name))
            .cloned()
            .collect();

        if orphans.is_empty() {
            return Ok(Vec::new());
        }

        let mut types = self.content_types()?;
        for name in &orphans {
            self.remove_part(name);
            self.remove_part(&rels_part_name(name));
            types.remove_override(name);
            log::debug!("Dropped unreferenced part {}", name);
        }
        self.set_content_types(&types)?;

        Ok(orphans.into_iter().collect())
    }

    /// Serialize to ZIP bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write_to(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        // Content types first, as Office writes it
        let ordered = self
            .parts
            .iter()
            .filter(|p| p.name == CONTENT_TYPES_PART)
            .chain(self.parts.iter().filter(|p| p.name != CONTENT_TYPES_PART));

        for part in ordered {
            zip.start_file(part.name.as_str(), options)
                .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", part.name, e)))?;
            zip.write_all(&part.data)
                .map_err(|e| Error::ZipError(format!("Failed to write '{}': {}", part.name, e)))?;
        }

        zip.finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish ZIP: {}", e)))?;
        Ok(())
    }

    /// Write the package to `path`, replacing it only once the new file is complete.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::from_write(e, path))?;
        if let Ok(meta) = std::fs::metadata(path) {
            // Keep the original file's permissions rather than the temp file's
            let _ = tmp.as_file().set_permissions(meta.permissions());
        }
        self.write_to(tmp.as_file_mut())?;
        tmp.as_file_mut()
            .flush()
            .map_err(|e| Error::from_write(e, path))?;
        tmp.persist(path)
            .map_err(|e| Error::from_write(e.error, path))?;
        Ok(())
    }
}

/// `[Content_Types].xml`: extension defaults and per-part overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTypes {
    defaults: Vec<(String, String)>,
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    /// Parse the content-type part.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let doc = XmlDocument::parse(bytes)?;
        let mut types = Self::default();
        for el in doc.root.elements() {
            match el.local_name() {
                "Default" => {
                    if let (Some(ext), Some(ct)) = (el.attr("Extension"), el.attr("ContentType")) {
                        types.defaults.push((ext.to_string(), ct.to_string()));
                    }
                }
                "Override" => {
                    if let (Some(name), Some(ct)) = (el.attr("PartName"), el.attr("ContentType")) {
                        types.overrides.push((name.to_string(), ct.to_string()));
                    }
                }
                _ => {}
            }
        }
        Ok(types)
    }

    /// Serialize back to XML.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut root = XmlElement::new("Types").with_attr("xmlns", CONTENT_TYPES_NS);
        for (ext, ct) in &self.defaults {
            root.push(
                XmlElement::new("Default")
                    .with_attr("Extension", ext.as_str())
                    .with_attr("ContentType", ct.as_str()),
            );
        }
        for (name, ct) in &self.overrides {
            root.push(
                XmlElement::new("Override")
                    .with_attr("PartName", name.as_str())
                    .with_attr("ContentType", ct.as_str()),
            );
        }
        XmlDocument::new(root).to_bytes()
    }

    /// Content type of a part: override first, then extension default.
    pub fn content_type(&self, part: &str) -> Option<&str> {
        let key = format!("/{}", part);
        if let Some((_, ct)) = self.overrides.iter().find(|(n, _)| n.eq_ignore_ascii_case(&key)) {
            return Some(ct);
        }
        let ext = part.rsplit_once('.')?.1;
        self.defaults
            .iter()
            .find(|(e, _)| e.eq_ignore_ascii_case(ext))
            .map(|(_, ct)| ct.as_str())
    }

    /// Register a default for an extension unless one exists.
    pub fn ensure_default(&mut self, extension: &str, content_type: &str) {
        if !self
            .defaults
            .iter()
            .any(|(e, _)| e.eq_ignore_ascii_case(extension))
        {
            self.defaults
                .push((extension.to_string(), content_type.to_string()));
        }
    }

    /// Add or replace the override for a part.
    pub fn set_override(&mut self, part: &str, content_type: &str) {
        let key = format!("/{}", part);
        match self.overrides.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(&key)) {
            Some((_, ct)) => *ct = content_type.to_string(),
            None => self.overrides.push((key, content_type.to_string())),
        }
    }

    /// Remove the override for a part.
    pub fn remove_override(&mut self, part: &str) {
        let key = format!("/{}", part);
        self.overrides.retain(|(n, _)| !n.eq_ignore_ascii_case(&key));
    }
}
