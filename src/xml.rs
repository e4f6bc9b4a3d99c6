//! Generic XML element tree
//!
//! The property registry keeps template records (charPr, paraPr, numbering,
//! borderFill) as plain element trees rather than a typed model: synthesis is
//! a structural clone of a template record followed by attribute and child
//! edits. Unknown template structure passes through serialization untouched.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

use crate::error::{Error, Result};

/// A node in an XML tree
#[derive(Clone, Debug)]
pub enum XmlNode {
    /// Element node
    Element(XmlElement),
    /// Text node
    Text(String),
    /// Comment node
    Comment(String),
}

/// An XML element with attributes and children
///
/// Names keep their prefix as written (e.g. `hh:charPr`); lookups go through
/// [`XmlElement::local_name`] so prefix variations in templates do not matter.
#[derive(Clone, Debug)]
pub struct XmlElement {
    /// Full element name, prefix included
    pub name: String,
    /// Attributes as (name, value) pairs in document order
    pub attributes: Vec<(String, String)>,
    /// Child nodes
    pub children: Vec<XmlNode>,
    /// Whether this was a self-closing element
    pub self_closing: bool,
}

impl XmlElement {
    /// Create a new empty element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: true,
        }
    }

    /// Parse a document and return its root element
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let start = e.to_owned();
                    return Self::from_reader(&mut reader, &start);
                }
                Event::Empty(e) => return Ok(Self::from_empty(&e)),
                Event::Eof => {
                    return Err(Error::InvalidDocument("no root element".into()));
                }
                _ => {}
            }
            buf.clear();
        }
    }

    /// Read a complete element from an XML reader (start tag already consumed)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).to_string();
        let attributes = read_attributes(start);

        let mut children = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let child = Self::from_reader(reader, &e.to_owned())?;
                    children.push(XmlNode::Element(child));
                }
                Event::Empty(e) => {
                    children.push(XmlNode::Element(Self::from_empty(&e)));
                }
                Event::Text(t) => {
                    let text = t.unescape()?.to_string();
                    if !text.is_empty() {
                        children.push(XmlNode::Text(text));
                    }
                }
                Event::Comment(c) => {
                    children.push(XmlNode::Comment(String::from_utf8_lossy(&c).to_string()));
                }
                Event::End(e) => {
                    if e.name().as_ref() == name.as_bytes() {
                        break;
                    }
                }
                Event::Eof => return Err(Error::InvalidDocument("unexpected EOF".into())),
                _ => {}
            }
            buf.clear();
        }

        Ok(Self {
            name,
            attributes,
            children,
            self_closing: false,
        })
    }

    /// Create from a self-closing tag
    pub fn from_empty(e: &BytesStart) -> Self {
        Self {
            name: String::from_utf8_lossy(e.name().as_ref()).to_string(),
            attributes: read_attributes(e),
            children: Vec::new(),
            self_closing: true,
        }
    }

    /// Element name without its namespace prefix
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    /// Get an attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get an attribute parsed as u32
    pub fn attr_u32(&self, name: &str) -> Option<u32> {
        self.attr(name).and_then(|v| v.parse().ok())
    }

    /// Set an attribute, replacing an existing value
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(pair) = self.attributes.iter_mut().find(|(k, _)| *k == name) {
            pair.1 = value;
        } else {
            self.attributes.push((name, value));
        }
    }

    /// Iterate over child elements
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|n| match n {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Iterate mutably over child elements
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|n| match n {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Find a direct child element by local name
    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.local_name() == local)
    }

    /// Find a direct child element by local name, mutably
    pub fn child_mut(&mut self, local: &str) -> Option<&mut XmlElement> {
        self.elements_mut().find(|e| e.local_name() == local)
    }

    /// Remove the first direct child element with the given local name
    pub fn remove_child(&mut self, local: &str) -> bool {
        let idx = self.children.iter().position(|n| {
            matches!(n, XmlNode::Element(e) if e.local_name() == local)
        });
        match idx {
            Some(i) => {
                self.children.remove(i);
                true
            }
            None => false,
        }
    }

    /// Get or create a direct child element with the given full name
    ///
    /// Lookup is by local name, so an existing `hc:left` satisfies a request
    /// for `hc:left` regardless of how the template spelled the prefix.
    pub fn ensure_child(&mut self, name: &str) -> &mut XmlElement {
        let local = name.rsplit(':').next().unwrap_or(name).to_string();
        let idx = self.children.iter().position(|n| {
            matches!(n, XmlNode::Element(e) if e.local_name() == local)
        });
        let idx = match idx {
            Some(i) => i,
            None => {
                self.children.push(XmlNode::Element(XmlElement::new(name)));
                self.self_closing = false;
                self.children.len() - 1
            }
        };
        match &mut self.children[idx] {
            XmlNode::Element(e) => e,
            _ => unreachable!(),
        }
    }

    /// Append a child element
    pub fn push_element(&mut self, element: XmlElement) {
        self.children.push(XmlNode::Element(element));
        self.self_closing = false;
    }

    /// Find the first descendant element (depth-first, self excluded)
    /// matching a predicate
    pub fn find_descendant<'a>(
        &'a self,
        pred: &impl Fn(&XmlElement) -> bool,
    ) -> Option<&'a XmlElement> {
        for child in self.elements() {
            if pred(child) {
                return Some(child);
            }
            if let Some(found) = child.find_descendant(pred) {
                return Some(found);
            }
        }
        None
    }

    /// Find the first descendant element matching a predicate, mutably
    pub fn find_descendant_mut(
        &mut self,
        pred: &impl Fn(&XmlElement) -> bool,
    ) -> Option<&mut XmlElement> {
        for child in self.elements_mut() {
            if pred(child) {
                return Some(child);
            }
            if let Some(found) = child.find_descendant_mut(pred) {
                return Some(found);
            }
        }
        None
    }

    /// Visit every descendant element with the given local name
    pub fn for_each_descendant(&self, local: &str, f: &mut impl FnMut(&XmlElement)) {
        for child in self.elements() {
            if child.local_name() == local {
                f(child);
            }
            child.for_each_descendant(local, f);
        }
    }

    /// Apply a function to every descendant element with the given local name
    pub fn for_each_descendant_mut(&mut self, local: &str, f: &mut impl FnMut(&mut XmlElement)) {
        for child in self.elements_mut() {
            if child.local_name() == local {
                f(child);
            }
            child.for_each_descendant_mut(local, f);
        }
    }

    /// Write element to an XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(&self.name);
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() && self.self_closing {
            writer.write_event(Event::Empty(start))?;
        } else {
            writer.write_event(Event::Start(start))?;
            for child in &self.children {
                child.write_to(writer)?;
            }
            writer.write_event(Event::End(BytesEnd::new(&self.name)))?;
        }

        Ok(())
    }

    /// Serialize this element (no XML declaration)
    pub fn to_xml(&self) -> Result<String> {
        let mut buffer = Vec::new();
        let mut writer = Writer::new(&mut buffer);
        self.write_to(&mut writer)?;
        String::from_utf8(buffer).map_err(|e| Error::InvalidDocument(e.to_string()))
    }

    /// Serialize this element as a document with an XML declaration
    pub fn to_document_xml(&self) -> Result<String> {
        let mut buffer = Vec::new();
        let mut writer = Writer::new(&mut buffer);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        self.write_to(&mut writer)?;
        String::from_utf8(buffer).map_err(|e| Error::InvalidDocument(e.to_string()))
    }

    /// Add an attribute (builder style)
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Add a child element (builder style)
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.push_element(child);
        self
    }

    /// Add a text child (builder style)
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self.self_closing = false;
        self
    }
}

impl XmlNode {
    /// Write node to an XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        match self {
            XmlNode::Element(e) => e.write_to(writer),
            XmlNode::Text(t) => {
                writer.write_event(Event::Text(BytesText::new(t)))?;
                Ok(())
            }
            XmlNode::Comment(c) => {
                writer.write_event(Event::Comment(BytesText::new(c)))?;
                Ok(())
            }
        }
    }
}

fn read_attributes(e: &BytesStart) -> Vec<(String, String)> {
    e.attributes()
        .filter_map(|a| a.ok())
        .map(|a| {
            (
                String::from_utf8_lossy(a.key.as_ref()).to_string(),
                String::from_utf8_lossy(&a.value).to_string(),
            )
        })
        .collect()
}
