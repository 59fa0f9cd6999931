//! Small mutable XML tree built on quick-xml.
//!
//! Slide editing needs to deep-copy shape subtrees, detach them from their
//! parent and read attributes regardless of namespace prefix. The streaming
//! reader used for extraction cannot do that, so parts that get edited are
//! loaded into this tree and written back out with the quick-xml writer.

use deck_core::{Error, Result};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Write;

/// Namespace URIs used by presentation parts.
pub mod ns {
    pub const PRESENTATION: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
    pub const DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
    pub const RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
}

/// A node in the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    CData(String),
    Comment(String),
}

/// An element with its qualified name, attributes in document order and children.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an empty element with a qualified name such as `p:pic`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Builder: append a child element.
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Builder: append a text node.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Name without the namespace prefix.
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Look up an attribute by local name, ignoring any prefix.
    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| !key.starts_with("xmlns") && local_name(key) == local)
            .map(|(_, value)| value.as_str())
    }

    /// Look up an attribute by its exact qualified name.
    ///
    /// Needed where an element carries both `id` and `r:id`.
    pub fn attr_exact(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute. An existing attribute with the same local name is
    /// replaced in place; otherwise `name` is appended as given.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let local = local_name(name);
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|(key, _)| !key.starts_with("xmlns") && local_name(key) == local)
        {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    /// Parse an attribute as an integer.
    pub fn attr_i64(&self, local: &str) -> Option<i64> {
        self.attr(local).and_then(|v| v.trim().parse().ok())
    }

    /// Iterate over child elements.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            _ => None,
        })
    }

    /// Iterate mutably over child elements.
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            _ => None,
        })
    }

    /// First child element with the given local name.
    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.elements().find(|el| el.local_name() == local)
    }

    /// First child element with the given local name, mutably.
    pub fn child_mut(&mut self, local: &str) -> Option<&mut XmlElement> {
        self.elements_mut().find(|el| el.local_name() == local)
    }

    /// Follow a chain of child local names.
    pub fn path(&self, locals: &[&str]) -> Option<&XmlElement> {
        locals
            .iter()
            .try_fold(self, |el, local| el.child(local))
    }

    /// Follow a chain of child local names, mutably.
    pub fn path_mut(&mut self, locals: &[&str]) -> Option<&mut XmlElement> {
        let mut current = self;
        for local in locals {
            current = current.child_mut(local)?;
        }
        Some(current)
    }

    /// First element in this subtree (self included, pre-order) with the local name.
    pub fn find(&self, local: &str) -> Option<&XmlElement> {
        if self.local_name() == local {
            return Some(self);
        }
        self.elements().find_map(|child| child.find(local))
    }

    /// Mutable variant of [`XmlElement::find`].
    pub fn find_mut(&mut self, local: &str) -> Option<&mut XmlElement> {
        if self.local_name() == local {
            return Some(self);
        }
        for child in self.elements_mut() {
            if let Some(found) = child.find_mut(local) {
                return Some(found);
            }
        }
        None
    }

    /// Every element in this subtree (self included) in pre-order.
    pub fn descendants(&self) -> Vec<&XmlElement> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out);
        out
    }

    fn collect_descendants<'a>(&'a self, out: &mut Vec<&'a XmlElement>) {
        out.push(self);
        for child in self.elements() {
            child.collect_descendants(out);
        }
    }

    /// Concatenated text content of the subtree.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                XmlNode::Text(t) | XmlNode::CData(t) => out.push_str(t),
                XmlNode::Element(el) => el.collect_text(out),
                XmlNode::Comment(_) => {}
            }
        }
    }

    /// Append a child element.
    pub fn push(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    /// Insert a child before the first child element with local name `before`,
    /// or append when there is none.
    pub fn insert_before(&mut self, child: XmlElement, before: &str) {
        let position = self.children.iter().position(
            |node| matches!(node, XmlNode::Element(el) if el.local_name() == before),
        );
        match position {
            Some(idx) => self.children.insert(idx, XmlNode::Element(child)),
            None => self.children.push(XmlNode::Element(child)),
        }
    }

    /// Detach every child element matching `pred`. Returns how many were removed.
    pub fn remove_children_where<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&XmlElement) -> bool,
    {
        let before = self.children.len();
        self.children
            .retain(|node| !matches!(node, XmlNode::Element(el) if pred(el)));
        before - self.children.len()
    }

    /// Detach every element in the subtree (excluding self) matching `pred`.
    pub fn remove_descendants_where<F>(&mut self, pred: &mut F) -> usize
    where
        F: FnMut(&XmlElement) -> bool,
    {
        let mut removed = self.remove_children_where(|el| pred(el));
        for child in self.elements_mut() {
            removed += child.remove_descendants_where(pred);
        }
        removed
    }
}

/// A parsed XML part.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    pub root: XmlElement,
}

impl XmlDocument {
    /// Wrap a root element.
    pub fn new(root: XmlElement) -> Self {
        Self { root }
    }

    /// Parse part bytes (UTF-8, optional BOM).
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
        let text = std::str::from_utf8(bytes)
            .map_err(|e| Error::XmlError(format!("Part is not valid UTF-8: {}", e)))?;
        Self::parse_str(text)
    }

    /// Parse XML text.
    pub fn parse_str(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => stack.push(element_from_start(e)?),
                Ok(Event::Empty(ref e)) => {
                    let el = element_from_start(e)?;
                    attach(&mut stack, &mut root, el)?;
                }
                Ok(Event::End(_)) => {
                    let el = stack
                        .pop()
                        .ok_or_else(|| Error::XmlError("Unbalanced end tag".into()))?;
                    attach(&mut stack, &mut root, el)?;
                }
                Ok(Event::Text(e)) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = e.unescape().map_err(|err| Error::XmlError(err.to_string()))?;
                        parent.children.push(XmlNode::Text(text.into_owned()));
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                        parent.children.push(XmlNode::CData(text));
                    }
                }
                Ok(Event::Comment(e)) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                        parent.children.push(XmlNode::Comment(text));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error at position {}: {}",
                        reader.buffer_position(),
                        e
                    )));
                }
                // Declaration, processing instructions, doctype
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(Error::XmlError(format!(
                "Unclosed element <{}>",
                stack[stack.len() - 1].name
            )));
        }
        root.map(Self::new)
            .ok_or_else(|| Error::XmlError("Document has no root element".into()))
    }

    /// Serialize with a standalone UTF-8 declaration.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(|e| Error::XmlError(e.to_string()))?;
        writer
            .write_event(Event::Text(BytesText::from_escaped("\r\n")))
            .map_err(|e| Error::XmlError(e.to_string()))?;
        write_element(&mut writer, &self.root).map_err(|e| Error::XmlError(e.to_string()))?;
        Ok(writer.into_inner())
    }

    /// Prefix bound to `uri` on the root element. Empty string for the default namespace.
    pub fn prefix_for(&self, uri: &str) -> Option<String> {
        self.root.attributes.iter().find_map(|(key, value)| {
            if value != uri {
                return None;
            }
            if key == "xmlns" {
                Some(String::new())
            } else {
                key.strip_prefix("xmlns:").map(str::to_string)
            }
        })
    }

    /// Prefix for `uri`, declaring it on the root under `preferred` when missing.
    pub fn ensure_namespace(&mut self, preferred: &str, uri: &str) -> String {
        if let Some(prefix) = self.prefix_for(uri) {
            return prefix;
        }
        let taken = |p: &str| {
            self.root
                .attributes
                .iter()
                .any(|(key, _)| key.strip_prefix("xmlns:") == Some(p))
        };
        let mut prefix = preferred.to_string();
        let mut n = 1;
        while taken(&prefix) {
            prefix = format!("{}{}", preferred, n);
            n += 1;
        }
        self.root
            .attributes
            .push((format!("xmlns:{}", prefix), uri.to_string()));
        prefix
    }
}

/// Build a qualified name from a prefix (possibly empty) and a local name.
pub fn qname(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{}:{}", prefix, local)
    }
}

/// Extract the local name from a potentially namespaced XML name.
pub fn local_name(name: &str) -> &str {
    match name.rfind(':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

fn element_from_start(e: &BytesStart) -> Result<XmlElement> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut el = XmlElement::new(name);
    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::XmlError(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| Error::XmlError(err.to_string()))?
            .into_owned();
        el.attributes.push((key, value));
    }
    Ok(el)
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, el: XmlElement) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(el)),
        None if root.is_none() => *root = Some(el),
        None => return Err(Error::XmlError("Multiple root elements".into())),
    }
    Ok(())
}

fn write_element<W: Write>(writer: &mut Writer<W>, el: &XmlElement) -> quick_xml::Result<()> {
    let mut start = BytesStart::new(el.name.as_str());
    for (key, value) in &el.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if el.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for node in &el.children {
        match node {
            XmlNode::Element(child) => write_element(writer, child)?,
            XmlNode::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
            XmlNode::CData(text) => writer.write_event(Event::CData(BytesCData::new(text.as_str())))?,
            XmlNode::Comment(text) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(el.name.as_str())))?;
    Ok(())
}
