//! Relationship tables (`*.rels` parts).

use crate::xml::{XmlDocument, XmlElement};
use deck_core::Result;

/// Relationship type URIs used by the editor.
pub mod rel_type {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
    pub const SLIDE_LAYOUT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
    pub const NOTES_SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide";
    pub const COMMENTS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/comments";
    pub const IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
}

const PACKAGE_RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// A relationship entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target reference, relative to the source part's directory
    pub target: String,
    /// Whether the target lives outside the package
    pub external: bool,
}

/// Relationships of one source part, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relationships {
    items: Vec<Relationship>,
}

impl Relationships {
    /// Create a new empty relationships collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `.rels` part.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let doc = XmlDocument::parse(bytes)?;
        let items = doc
            .root
            .elements()
            .filter(|el| el.local_name() == "Relationship")
            .map(|el| Relationship {
                id: el.attr("Id").unwrap_or_default().to_string(),
                rel_type: el.attr("Type").unwrap_or_default().to_string(),
                target: el.attr("Target").unwrap_or_default().to_string(),
                external: el
                    .attr("TargetMode")
                    .is_some_and(|m| m.eq_ignore_ascii_case("External")),
            })
            .collect();
        Ok(Self { items })
    }

    /// Serialize back to a `.rels` part.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut root = XmlElement::new("Relationships").with_attr("xmlns", PACKAGE_RELS_NS);
        for rel in &self.items {
            let mut el = XmlElement::new("Relationship")
                .with_attr("Id", rel.id.as_str())
                .with_attr("Type", rel.rel_type.as_str())
                .with_attr("Target", rel.target.as_str());
            if rel.external {
                el = el.with_attr("TargetMode", "External");
            }
            root.push(el);
        }
        XmlDocument::new(root).to_bytes()
    }

    /// Get a relationship by ID.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.id == id)
    }

    /// First relationship of a type.
    pub fn first_of_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.rel_type == rel_type)
    }

    /// Iterate over all relationships.
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Smallest unused `rIdN`.
    pub fn next_id(&self) -> String {
        let mut n = 1;
        loop {
            let candidate = format!("rId{}", n);
            if self.get(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    /// Add an internal relationship and return its new ID.
    pub fn add(&mut self, rel_type: &str, target: &str) -> String {
        let id = self.next_id();
        self.items.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            external: false,
        });
        id
    }

    /// Reuse an existing internal relationship to `target` of this type, or add one.
    pub fn get_or_add(&mut self, rel_type: &str, target: &str) -> String {
        if let Some(rel) = self
            .items
            .iter()
            .find(|r| !r.external && r.rel_type == rel_type && r.target == target)
        {
            return rel.id.clone();
        }
        self.add(rel_type, target)
    }

    /// Insert a relationship keeping its ID.
    pub fn push(&mut self, rel: Relationship) {
        self.items.push(rel);
    }

    /// Remove a relationship by ID.
    pub fn remove(&mut self, id: &str) -> Option<Relationship> {
        let idx = self.items.iter().position(|r| r.id == id)?;
        Some(self.items.remove(idx))
    }
}

/// Name of the `.rels` part holding the relationships of `part` (`""` = package).
pub fn rels_part_name(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None if part.is_empty() => "_rels/.rels".to_string(),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against its source part into a part name.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return normalize(absolute);
    }
    let base = match source_part.rsplit_once('/') {
        Some((dir, _)) => format!("{}/{}", dir, target),
        None => target.to_string(),
    };
    normalize(&base)
}

/// Relative reference from `source_part` to `target_part`, as stored in a `.rels` part.
pub fn relative_target(source_part: &str, target_part: &str) -> String {
    let source_dir: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    let target: Vec<&str> = target_part.split('/').collect();
    let (target_dir, target_file) = target.split_at(target.len() - 1);

    let common = source_dir
        .iter()
        .zip(target_dir.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = Vec::new();
    parts.extend(std::iter::repeat("..").take(source_dir.len() - common));
    parts.extend(&target_dir[common..]);
    parts.extend(target_file);
    parts.join("/")
}

fn normalize(path: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            s => out.push(s),
        }
    }
    out.join("/")
}
