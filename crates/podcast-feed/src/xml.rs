// crates/podcast-feed/src/xml.rs
//! In-memory XML tree for generated feeds
//!
//! Text and attribute values stored in the tree are already escaped; the
//! serializer writes them as-is. CDATA content is stored raw.

use crate::error::{FeedError, FeedResult};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{Cursor, Write};

/// A node inside an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// Child element
    Element(XmlElement),
    /// Escaped character data
    Text(String),
    /// Raw content written as one or more CDATA sections
    CData(String),
}

/// An element with attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    /// Creates an empty element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Adds an attribute with an already escaped value
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Adds escaped text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Adds raw content as a CDATA section
    pub fn with_cdata(mut self, content: impl Into<String>) -> Self {
        self.children.push(XmlNode::CData(content.into()));
        self
    }

    /// Sets an attribute, replacing an existing one with the same key
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Adds a child element, builder style
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.push(child);
        self
    }

    /// Appends a child element
    pub fn push(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    /// Element name including any namespace prefix
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value of an attribute
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Attributes in insertion order
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// All child nodes
    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// Child elements in document order
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            _ => None,
        })
    }

    /// First child element with the given name
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|el| el.name == name)
    }

    /// Child elements with the given name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |el| el.name == name)
    }

    /// Concatenated text and CDATA content of direct children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(t) | XmlNode::CData(t) => Some(t.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> FeedResult<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            // Raw byte pairs are not escaped again
            start.push_attribute((key.as_bytes(), value.as_bytes()));
        }

        if self.children.is_empty() {
            return write_event(writer, Event::Empty(start));
        }

        write_event(writer, Event::Start(start))?;
        for child in &self.children {
            match child {
                XmlNode::Element(el) => el.write_to(writer)?,
                XmlNode::Text(text) => {
                    write_event(writer, Event::Text(BytesText::from_escaped(text.as_str())))?
                }
                XmlNode::CData(content) => {
                    for section in cdata_sections(content) {
                        write_event(writer, Event::CData(BytesCData::new(section)))?;
                    }
                }
            }
        }
        write_event(writer, Event::End(BytesEnd::new(self.name.as_str())))
    }
}

/// A complete XML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    root: XmlElement,
}

impl XmlDocument {
    /// Wraps a root element
    pub fn new(root: XmlElement) -> Self {
        Self { root }
    }

    /// The document element
    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// Consumes the document, returning the root element
    pub fn into_root(self) -> XmlElement {
        self.root
    }

    /// Serializes to a UTF-8 string with an XML declaration
    pub fn to_xml(&self) -> FeedResult<String> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        write_event(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        )?;
        self.root.write_to(&mut writer)?;

        let bytes = writer.into_inner().into_inner();
        String::from_utf8(bytes).map_err(|e| FeedError::XmlWrite(e.to_string()))
    }
}

fn write_event<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> FeedResult<()> {
    writer
        .write_event(event)
        .map_err(|e| FeedError::XmlWrite(e.to_string()))
}

/// Splits content so no section contains the `]]>` terminator
fn cdata_sections(content: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut rest = content;
    while let Some(pos) = rest.find("]]>") {
        sections.push(&rest[..pos + 2]);
        rest = &rest[pos + 2..];
    }
    sections.push(rest);
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_children() {
        let mut root = XmlElement::new("channel");
        root.push(
            XmlElement::new("image")
                .with_child(XmlElement::new("url").with_text("http://x.test/a.png")),
        );

        let image = root.find("image").expect("image present");
        assert_eq!(image.find("url").map(|u| u.text()), Some("http://x.test/a.png".to_string()));
    }

    #[test]
    fn test_set_attribute_replaces() {
        let mut el = XmlElement::new("guid").with_attribute("isPermaLink", "false");
        el.set_attribute("isPermaLink", "true");
        assert_eq!(el.attributes().len(), 1);
        assert_eq!(el.attribute("isPermaLink"), Some("true"));
    }

    #[test]
    fn test_serialize_keeps_escaped_values() {
        let doc = XmlDocument::new(
            XmlElement::new("category")
                .with_attribute("text", "A&amp;B")
                .with_text("Fish &amp; Chips"),
        );
        let xml = doc.to_xml().expect("serializes");
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<category text=\"A&amp;B\">Fish &amp; Chips</category>"));
    }

    #[test]
    fn test_serialize_empty_element() {
        let doc = XmlDocument::new(XmlElement::new("enclosure").with_attribute("url", "u"));
        let xml = doc.to_xml().expect("serializes");
        assert!(xml.contains("<enclosure url=\"u\"/>"));
    }

    #[test]
    fn test_serialize_cdata() {
        let doc = XmlDocument::new(XmlElement::new("description").with_cdata("<p>Hi & bye</p>"));
        let xml = doc.to_xml().expect("serializes");
        assert!(xml.contains("<description><![CDATA[<p>Hi & bye</p>]]></description>"));
    }

    #[test]
    fn test_cdata_terminator_is_split() {
        assert_eq!(cdata_sections("a]]>b"), vec!["a]]", ">b"]);
        assert_eq!(cdata_sections("plain"), vec!["plain"]);
        assert_eq!(cdata_sections("]]>]]>"), vec!["]]", ">]]", ">"]);

        let doc = XmlDocument::new(XmlElement::new("d").with_cdata("x]]>y"));
        let xml = doc.to_xml().expect("serializes");
        assert!(xml.contains("<d><![CDATA[x]]]]><![CDATA[>y]]></d>"));
    }

    #[test]
    fn test_text_concatenates_direct_children() {
        let el = XmlElement::new("p").with_text("a").with_cdata("b");
        assert_eq!(el.text(), "ab");
    }
}
