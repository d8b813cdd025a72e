/*!
 * Minimal owned XML tree for package parts.
 *
 * Parts are parsed into `XmlElement` nodes with their qualified names and
 * attributes kept verbatim, edited in place, and written back out. Nodes the
 * editor never touches (comments, CDATA, processing instructions) are kept as
 * raw content so a round trip does not drop them.
 */

use std::io::Write;

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::errors::DocumentError;

/// Kind of passthrough node
#[derive(Debug, Clone, PartialEq)]
pub enum RawKind {
    Comment,
    CData,
    Instruction,
}

/// A node in the tree
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    /// Element with children
    Element(XmlElement),
    /// Unescaped character data
    Text(String),
    /// Content kept as-is
    Raw(RawKind, String),
}

/// An element with its qualified name, attributes and children
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    /// Qualified name, e.g. `w:p`
    pub name: String,
    /// Attributes in document order, values unescaped
    pub attributes: Vec<(String, String)>,
    /// Child nodes in document order
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an empty element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Builder-style child append
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Builder-style text append
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Whether this element has the given qualified name
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    /// Look up an attribute value by qualified name
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set or replace an attribute
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Iterate over child elements
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> + '_ {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Iterate mutably over child elements
    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> + '_ {
        self.children.iter_mut().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    /// First child element with the given name
    pub fn find_child(&self, name: &str) -> Option<&XmlElement> {
        self.child_elements().find(|e| e.is(name))
    }

    /// First child element with the given name, mutably
    pub fn find_child_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        self.child_elements_mut().find(|e| e.is(name))
    }

    /// Remove every child node matching the predicate, returning how many went
    pub fn remove_children<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&XmlNode) -> bool,
    {
        let before = self.children.len();
        self.children.retain(|node| !predicate(node));
        before - self.children.len()
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlNode::Text(text) => out.push_str(text),
                XmlNode::Element(element) => element.collect_text(out),
                XmlNode::Raw(RawKind::CData, content) => out.push_str(content),
                XmlNode::Raw(..) => {}
            }
        }
    }

    /// Replace all children with a single text node
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children.clear();
        self.children.push(XmlNode::Text(text.into()));
    }
}

/// A parsed package part
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    /// Root element
    pub root: XmlElement,
}

impl XmlDocument {
    /// Parse a part from its markup
    pub fn parse(xml: &str, part: &str) -> Result<Self, DocumentError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| xml_error(part, format!("at byte {}: {}", reader.buffer_position(), e)))?;

            match event {
                Event::Start(start) => stack.push(element_from_start(&start, part)?),
                Event::Empty(start) => {
                    let element = element_from_start(&start, part)?;
                    attach(&mut stack, &mut root, element, part)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| xml_error(part, "closing tag without an open element"))?;
                    attach(&mut stack, &mut root, element, part)?;
                }
                Event::Text(text) => {
                    // Whitespace outside the root element carries no content
                    if let Some(parent) = stack.last_mut() {
                        let unescaped = text.unescape().map_err(|e| xml_error(part, e.to_string()))?;
                        parent.children.push(XmlNode::Text(unescaped.into_owned()));
                    }
                }
                Event::CData(data) => {
                    if let Some(parent) = stack.last_mut() {
                        let content = String::from_utf8_lossy(&data.into_inner()).into_owned();
                        parent.children.push(XmlNode::Raw(RawKind::CData, content));
                    }
                }
                Event::Comment(comment) => {
                    if let Some(parent) = stack.last_mut() {
                        let content = String::from_utf8_lossy(&comment).into_owned();
                        parent.children.push(XmlNode::Raw(RawKind::Comment, content));
                    }
                }
                Event::PI(instruction) => {
                    if let Some(parent) = stack.last_mut() {
                        let content = String::from_utf8_lossy(&instruction).into_owned();
                        parent.children.push(XmlNode::Raw(RawKind::Instruction, content));
                    }
                }
                Event::Decl(_) | Event::DocType(_) => {}
                Event::Eof => break,
            }
        }

        if !stack.is_empty() {
            return Err(xml_error(part, format!("unclosed element <{}>", stack[stack.len() - 1].name)));
        }

        root.map(|root| Self { root })
            .ok_or_else(|| xml_error(part, "document has no root element"))
    }

    /// Serialize the part with a standalone XML declaration
    pub fn to_bytes(&self, part: &str) -> Result<Vec<u8>, DocumentError> {
        let mut writer = Writer::new(Vec::new());
        emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))), part)?;
        emit(&mut writer, Event::Text(BytesText::from_escaped("\r\n")), part)?;
        write_element(&mut writer, &self.root, part)?;
        Ok(writer.into_inner())
    }
}

fn xml_error(part: &str, message: impl Into<String>) -> DocumentError {
    DocumentError::Xml {
        part: part.to_string(),
        message: message.into(),
    }
}

fn element_from_start(start: &BytesStart<'_>, part: &str) -> Result<XmlElement, DocumentError> {
    let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| xml_error(part, e.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| xml_error(part, e.to_string()))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
    part: &str,
) -> Result<(), DocumentError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => return Err(xml_error(part, "more than one root element")),
    }
    Ok(())
}

fn emit<W: Write>(writer: &mut Writer<W>, event: Event<'_>, part: &str) -> Result<(), DocumentError> {
    writer
        .write_event(event)
        .map_err(|e| xml_error(part, e.to_string()))
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &XmlElement, part: &str) -> Result<(), DocumentError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return emit(writer, Event::Empty(start), part);
    }

    emit(writer, Event::Start(start), part)?;
    for child in &element.children {
        match child {
            XmlNode::Element(child) => write_element(writer, child, part)?,
            XmlNode::Text(text) => emit(writer, Event::Text(BytesText::new(text)), part)?,
            XmlNode::Raw(RawKind::Comment, content) => {
                emit(writer, Event::Comment(BytesText::from_escaped(content.as_str())), part)?
            }
            XmlNode::Raw(RawKind::CData, content) => {
                emit(writer, Event::CData(BytesCData::new(content.as_str())), part)?
            }
            XmlNode::Raw(RawKind::Instruction, content) => {
                emit(writer, Event::PI(BytesPI::new(content.as_str())), part)?
            }
        }
    }
    emit(writer, Event::End(BytesEnd::new(element.name.as_str())), part)
}
