//! In-memory XML element tree backed by quick-xml
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Everything outside
//! elements and text (declaration, comments, doctype, processing
//! instructions) is kept verbatim so an unmodified document serializes back
//! to equivalent bytes. Detached nodes stay in the arena; their handles remain
//! valid but they are never written.

use std::fs;
use std::path::Path;

use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use tracing::debug;

use crate::document::{DocumentTree, PersistDocument};
use crate::{Error, Result};

/// Handle to a node inside an [`XmlDocument`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
enum Node {
    Element(Element),
    Text(String),
    CData(String),
    /// Declaration, comment, doctype or PI, written back unchanged
    Markup(Event<'static>),
}

/// Mutable XML document
#[derive(Debug, Clone)]
pub struct XmlDocument {
    nodes: Vec<Node>,
    /// Top-level nodes in order (prolog, root element, trailing misc)
    top: Vec<NodeId>,
    root: NodeId,
}

impl XmlDocument {
    /// Read and parse a document from disk.
    ///
    /// I/O failures surface as [`Error::Io`]; anything that is not
    /// well-formed UTF-8 XML surfaces as [`Error::Parse`].
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let text = String::from_utf8(bytes)
            .map_err(|e| Error::Parse(format!("not valid UTF-8: {}", e)))?;
        Self::parse_str(&text)
    }

    /// Parse a document from a string
    pub fn parse_str(xml: &str) -> Result<Self> {
        let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
        let mut reader = Reader::from_str(xml);
        let mut builder = TreeBuilder::default();

        loop {
            let event = reader.read_event().map_err(|e| {
                Error::Parse(format!("at byte {}: {}", reader.buffer_position(), e))
            })?;

            match event {
                Event::Start(start) => {
                    let id = builder.attach(Node::Element(element_from(&start)?))?;
                    builder.open.push(id);
                }
                Event::Empty(start) => {
                    builder.attach(Node::Element(element_from(&start)?))?;
                }
                Event::End(_) => {
                    builder
                        .open
                        .pop()
                        .ok_or_else(|| Error::Parse("unexpected closing tag".to_string()))?;
                }
                Event::Text(text) => {
                    let content = text.unescape().map_err(|e| Error::Parse(e.to_string()))?;
                    builder.attach(Node::Text(content.into_owned()))?;
                }
                Event::CData(data) => {
                    let content = String::from_utf8(data.into_inner().into_owned())
                        .map_err(|e| Error::Parse(e.to_string()))?;
                    builder.attach(Node::CData(content))?;
                }
                Event::Eof => break,
                other => {
                    builder.attach(Node::Markup(other.into_owned()))?;
                }
            }
        }

        builder.finish()
    }

    /// Serialize the document
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        for &id in &self.top {
            self.write_node(&mut writer, id)?;
        }
        String::from_utf8(writer.into_inner()).map_err(|e| Error::Serialize(e.to_string()))
    }

    /// Serialize the document and write it to `path`.
    ///
    /// The output is fully rendered before the file is touched, so a
    /// serialization failure never leaves a truncated file behind.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let xml = self.to_xml_string()?;
        fs::write(path, xml)?;
        debug!("Wrote {}", path.display());
        Ok(())
    }

    fn element(&self, id: NodeId) -> Option<&Element> {
        match self.nodes.get(id.0) {
            Some(Node::Element(element)) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.nodes.get_mut(id.0) {
            Some(Node::Element(element)) => Some(element),
            _ => None,
        }
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn write_node(&self, writer: &mut Writer<Vec<u8>>, id: NodeId) -> Result<()> {
        let result = match &self.nodes[id.0] {
            Node::Element(element) => {
                let mut start = BytesStart::new(element.tag.as_str());
                for (key, value) in &element.attributes {
                    start.push_attribute((key.as_str(), value.as_str()));
                }
                if element.children.is_empty() {
                    writer.write_event(Event::Empty(start))
                } else {
                    writer
                        .write_event(Event::Start(start))
                        .map_err(|e| Error::Serialize(e.to_string()))?;
                    for &child in &element.children {
                        self.write_node(writer, child)?;
                    }
                    writer.write_event(Event::End(BytesEnd::new(element.tag.as_str())))
                }
            }
            Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text))),
            Node::CData(text) => writer.write_event(Event::CData(BytesCData::new(text.as_str()))),
            Node::Markup(event) => writer.write_event(event.clone()),
        };
        result.map_err(|e| Error::Serialize(e.to_string()))
    }
}

impl DocumentTree for XmlDocument {
    type Node = NodeId;

    fn root(&self) -> NodeId {
        self.root
    }

    fn descendants_by_tag(&self, node: NodeId, tag: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut pending: Vec<NodeId> = match self.element(node) {
            Some(element) => element.children.iter().rev().copied().collect(),
            None => return found,
        };

        // Pre-order walk; children pushed reversed to keep document order
        while let Some(id) = pending.pop() {
            if let Some(element) = self.element(id) {
                if element.tag == tag {
                    found.push(id);
                }
                pending.extend(element.children.iter().rev().copied());
            }
        }
        found
    }

    fn has_content(&self, node: NodeId) -> bool {
        self.element(node).is_some_and(|element| {
            element.children.iter().any(|&child| match &self.nodes[child.0] {
                Node::Element(_) => true,
                Node::Text(text) | Node::CData(text) => !text.trim().is_empty(),
                Node::Markup(_) => false,
            })
        })
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn text(&self, node: NodeId) -> Option<String> {
        let element = self.element(node)?;
        let mut text: Option<String> = None;
        for &child in &element.children {
            if let Node::Text(part) | Node::CData(part) = &self.nodes[child.0] {
                text.get_or_insert_with(String::new).push_str(part);
            }
        }
        text
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::Element(Element {
            tag: tag.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
        }))
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(element) = self.element_mut(node) {
            match element.attributes.iter_mut().find(|(key, _)| key == name) {
                Some((_, existing)) => *existing = value.to_string(),
                None => element
                    .attributes
                    .push((name.to_string(), value.to_string())),
            }
        }
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(element) = self.element_mut(parent) {
            element.children.push(child);
        }
    }

    fn remove_children(&mut self, node: NodeId) {
        if let Some(element) = self.element_mut(node) {
            element.children.clear();
        }
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if self.element(node).is_none() {
            return;
        }
        let text_node = self.push(Node::Text(text.to_string()));
        if let Some(element) = self.element_mut(node) {
            element.children.clear();
            element.children.push(text_node);
        }
    }
}

impl PersistDocument for XmlDocument {
    fn save(&self, path: &Path) -> Result<()> {
        self.write_to(path)
    }
}

#[derive(Default)]
struct TreeBuilder {
    nodes: Vec<Node>,
    top: Vec<NodeId>,
    open: Vec<NodeId>,
    root: Option<NodeId>,
}

impl TreeBuilder {
    fn attach(&mut self, node: Node) -> Result<NodeId> {
        let is_element = matches!(node, Node::Element(_));
        if self.open.is_empty() {
            match &node {
                Node::Element(_) if self.root.is_some() => {
                    return Err(Error::Parse("multiple root elements".to_string()));
                }
                Node::Text(text) if !text.trim().is_empty() => {
                    return Err(Error::Parse("text outside the root element".to_string()));
                }
                Node::CData(_) => {
                    return Err(Error::Parse("CDATA outside the root element".to_string()));
                }
                _ => {}
            }
        }

        self.nodes.push(node);
        let id = NodeId(self.nodes.len() - 1);

        match self.open.last() {
            Some(parent) => {
                if let Node::Element(element) = &mut self.nodes[parent.0] {
                    element.children.push(id);
                }
            }
            None => {
                if is_element {
                    self.root = Some(id);
                }
                self.top.push(id);
            }
        }
        Ok(id)
    }

    fn finish(self) -> Result<XmlDocument> {
        if let Some(&unclosed) = self.open.last() {
            let tag = match &self.nodes[unclosed.0] {
                Node::Element(element) => element.tag.clone(),
                _ => String::new(),
            };
            return Err(Error::Parse(format!("unclosed element <{}>", tag)));
        }
        let root = self
            .root
            .ok_or_else(|| Error::Parse("no root element".to_string()))?;
        Ok(XmlDocument {
            nodes: self.nodes,
            top: self.top,
            root,
        })
    }
}

fn element_from(start: &BytesStart) -> Result<Element> {
    let tag = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| Error::Parse(e.to_string()))?
        .to_string();

    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| Error::Parse(e.to_string()))?;
        let key = std::str::from_utf8(attribute.key.as_ref())
            .map_err(|e| Error::Parse(e.to_string()))?
            .to_string();
        let value = attribute
            .unescape_value()
            .map_err(|e| Error::Parse(e.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(Element {
        tag,
        attributes,
        children: Vec::new(),
    })
}
