//! Owned, mutable XML element tree.
//!
//! Annotation documents are parsed once with `roxmltree` and converted into [`XmlElement`]s,
//! which the preprocessing filters are allowed to rewrite in place (for example renaming
//! `<pathParam>` into `<param in="path">`). Every later phase reads the same tree.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use log::debug;
use std::fs;
use std::path::Path;

/// A node inside an [`XmlElement`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An XML element with ordered attributes and mixed content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    /// Local tag name
    pub name: String,
    /// Attributes in document order
    pub attributes: IndexMap<String, String>,
    /// Child elements and text, in document order
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an empty element with the given tag name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Parses an XML string and returns its root element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::XmlParse`] when the input is not well-formed XML.
    pub fn parse(content: &str) -> Result<Self> {
        Self::parse_named(content, Path::new("<memory>"))
    }

    /// Reads and parses an XML file, returning its root element.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not well-formed XML.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading XML file: {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::parse_named(&content, path)
    }

    fn parse_named(content: &str, origin: &Path) -> Result<Self> {
        let document = roxmltree::Document::parse(content).map_err(|e| Error::XmlParse {
            file: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self::from_node(document.root_element()))
    }

    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let mut element = XmlElement::new(node.tag_name().name());
        for attribute in node.attributes() {
            element
                .attributes
                .insert(attribute.name().to_string(), attribute.value().to_string());
        }
        for child in node.children() {
            if child.is_element() {
                element.children.push(XmlNode::Element(Self::from_node(child)));
            } else if child.is_text() {
                if let Some(text) = child.text() {
                    element.children.push(XmlNode::Text(text.to_string()));
                }
            }
        }
        element
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    /// Direct child elements
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// Mutable direct child elements
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// Direct child elements with the given tag name
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |element| element.name == name)
    }

    pub fn first_element(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|element| element.name == name)
    }

    /// Every descendant element (depth first, document order), excluding `self`
    pub fn descendants(&self) -> Vec<&XmlElement> {
        let mut found = Vec::new();
        Self::collect_descendants(self, &mut found);
        found
    }

    fn collect_descendants<'a>(element: &'a XmlElement, found: &mut Vec<&'a XmlElement>) {
        for child in element.elements() {
            found.push(child);
            Self::collect_descendants(child, found);
        }
    }

    /// Descendant elements with the given tag name
    pub fn descendants_named(&self, name: &str) -> Vec<&XmlElement> {
        self.descendants()
            .into_iter()
            .filter(|element| element.name == name)
            .collect()
    }

    /// Raw concatenation of all descendant text nodes
    pub fn text(&self) -> String {
        let mut text = String::new();
        Self::collect_text(self, &mut text);
        text
    }

    fn collect_text(element: &XmlElement, out: &mut String) {
        for child in &element.children {
            match child {
                XmlNode::Text(text) => out.push_str(text),
                XmlNode::Element(inner) => Self::collect_text(inner, out),
            }
        }
    }

    /// Human readable text of the element.
    ///
    /// Whitespace runs collapse to a single space. Child elements listed in `skip` are left out
    /// entirely, and `<see cref="T:Ns.Type"/>` references render as the short type name.
    pub fn display_text(&self, skip: &[&str]) -> String {
        let mut raw = String::new();
        self.collect_display_text(skip, &mut raw);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn collect_display_text(&self, skip: &[&str], out: &mut String) {
        for child in &self.children {
            match child {
                XmlNode::Text(text) => out.push_str(text),
                XmlNode::Element(inner) if skip.contains(&inner.name.as_str()) => {}
                XmlNode::Element(inner) if inner.name == "see" && inner.children.is_empty() => {
                    if let Some(cref) = inner.attribute("cref") {
                        out.push(' ');
                        out.push_str(short_type_name(cref));
                        out.push(' ');
                    }
                }
                XmlNode::Element(inner) => inner.collect_display_text(skip, out),
            }
        }
    }

    /// `cref` values of the direct `<see>` children, in document order
    pub fn see_crefs(&self) -> Vec<String> {
        self.elements_named("see")
            .filter_map(|see| see.attribute("cref"))
            .map(str::to_string)
            .collect()
    }
}

/// Strips the member-kind prefix (`T:`, `P:`, ...) from a documentation member id
pub fn strip_member_prefix(cref: &str) -> &str {
    match cref.split_once(':') {
        Some((prefix, rest)) if prefix.len() == 1 => rest,
        _ => cref,
    }
}

fn short_type_name(cref: &str) -> &str {
    let name = strip_member_prefix(cref);
    let name = name.split('`').next().unwrap_or(name);
    name.rsplit(['.', '+']).next().unwrap_or(name)
}
