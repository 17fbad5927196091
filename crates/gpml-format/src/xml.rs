//! Minimal XML tree and serializer for writing GPML.
//!
//! The writer builds an [`XmlElement`] tree and serializes it with
//! two-space indentation. Elements containing text keep their content
//! inline, so comment text round-trips without gaining whitespace.

use std::fmt::Write as _;

/// XML 1.0 valid char ranges:
/// - 0x09, 0x0A, 0x0D
/// - 0x20..=0xD7FF
/// - 0xE000..=0xFFFD
/// - 0x10000..=0x10FFFF
fn is_valid_xml_char(c: char) -> bool {
    matches!(
        c as u32,
        0x09 | 0x0A | 0x0D | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x10000..=0x10FFFF
    )
}

/// Escapes text content, dropping characters XML 1.0 cannot represent.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if !is_valid_xml_char(c) {
            continue;
        }
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escapes an attribute value for use inside double quotes.
pub fn escape_attribute(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if !is_valid_xml_char(c) {
            continue;
        }
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\n' => escaped.push_str("&#10;"),
            '\t' => escaped.push_str("&#9;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Child content of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    /// Pre-serialized markup emitted verbatim (the BioPAX payload).
    Raw(String),
}

/// One element of the output tree. Attribute order is emission order.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        if let Some(entry) = self.attributes.iter_mut().find(|(n, _)| n == name) {
            entry.1 = value.to_owned();
        } else {
            self.attributes.push((name.to_owned(), value.to_owned()));
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn push_child(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    pub fn push_text(&mut self, text: &str) {
        self.children.push(XmlNode::Text(text.to_owned()));
    }

    /// Mutable access to the first child element with the given name.
    pub fn child_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        self.children.iter_mut().find_map(|node| match node {
            XmlNode::Element(el) if el.name == name => Some(el),
            _ => None,
        })
    }

    fn has_inline_content(&self) -> bool {
        self.children
            .iter()
            .any(|c| matches!(c, XmlNode::Text(_) | XmlNode::Raw(_)))
    }

    fn write_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        let _ = write!(out, "{indent}<{}", self.name);
        for (name, value) in &self.attributes {
            let _ = write!(out, " {name}=\"{}\"", escape_attribute(value));
        }
        if self.children.is_empty() {
            out.push_str(" />\n");
            return;
        }
        if self.has_inline_content() {
            // Text-bearing elements are written without inner indentation so
            // their content survives a round trip byte for byte.
            out.push('>');
            for child in &self.children {
                match child {
                    XmlNode::Text(text) => out.push_str(&escape_text(text)),
                    XmlNode::Raw(raw) => out.push_str(raw),
                    XmlNode::Element(el) => {
                        let mut nested = String::new();
                        el.write_into(&mut nested, 0);
                        out.push_str(nested.trim_end_matches('\n'));
                    }
                }
            }
            let _ = write!(out, "</{}>\n", self.name);
            return;
        }
        out.push_str(">\n");
        for child in &self.children {
            if let XmlNode::Element(el) = child {
                el.write_into(out, depth + 1);
            }
        }
        let _ = write!(out, "{indent}</{}>\n", self.name);
    }
}

/// Serializes a document: XML declaration plus the pretty-printed tree.
pub fn serialize_document(root: &XmlElement) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    root.write_into(&mut out, 0);
    out
}
