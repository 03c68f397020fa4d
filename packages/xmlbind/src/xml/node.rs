//! Owned XML element tree.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Namespace-qualified name of an element or attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QName {
    /// Namespace URI, `None` for names in no namespace.
    pub namespace: Option<String>,
    /// Local part of the name.
    pub local: String,
}

impl QName {
    /// Create a name, optionally namespaced.
    pub fn new(namespace: Option<&str>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            local: local.into(),
        }
    }

    /// Create a name in no namespace.
    pub fn local(local: impl Into<String>) -> Self {
        Self::new(None, local)
    }

    /// Namespace URI as a string slice.
    #[must_use]
    pub fn ns(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

/// Clark notation: `{uri}local`, or just `local` without a namespace.
impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{ns}}}{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// An XML element with its attributes, text and child elements.
///
/// Text follows the element/tail model: `text` is the character data before
/// the first child element, and each child's `tail` is the character data
/// that follows it inside this element. Whitespace-only text is not kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlNode {
    pub name: QName,
    /// Attributes in document order.
    pub attributes: Vec<(QName, String)>,
    /// Child elements in document order.
    pub children: Vec<XmlNode>,
    pub text: Option<String>,
    pub tail: Option<String>,
    /// Namespace declarations made on this element (prefix, URI).
    /// `None` is the default namespace.
    pub namespaces: Vec<(Option<String>, String)>,
}

impl XmlNode {
    /// Create an empty element.
    #[must_use]
    pub fn new(name: QName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
            text: None,
            tail: None,
            namespaces: Vec::new(),
        }
    }

    /// Set the text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: QName, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Append a child element.
    #[must_use]
    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    /// Declare a namespace prefix on this element.
    #[must_use]
    pub fn with_namespace(mut self, prefix: Option<&str>, uri: impl Into<String>) -> Self {
        self.namespaces.push((prefix.map(str::to_string), uri.into()));
        self
    }

    /// Look up an attribute value.
    #[must_use]
    pub fn attribute(&self, name: &QName) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value with the same name.
    pub fn set_attribute(&mut self, name: QName, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Whether the element has no attributes, text or children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty() && self.text.is_none()
    }

    /// Copy of this subtree without the tail text, for re-use in another parent.
    #[must_use]
    pub fn detached(&self) -> Self {
        let mut node = self.clone();
        node.tail = None;
        node
    }
}
