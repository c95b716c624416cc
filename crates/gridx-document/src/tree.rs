//! The canonical document tree.
//!
//! Every encoding converts to and from this structure. Leaves can be plain
//! text, CDATA, or typed [`Value`]s; typed leaves keep numbers and
//! date-times intact until the tree is rendered.

use std::borrow::Cow;

use gridx_model::{Value, format_invariant_number};

/// Date-time rendering used for typed leaves in markup.
pub const MARKUP_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    /// A typed scalar leaf.
    Value(Value),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Renders a leaf as markup text; elements render their text content.
    pub fn leaf_text(&self) -> Cow<'_, str> {
        match self {
            Self::Element(element) => Cow::Owned(element.text()),
            Self::Text(text) | Self::CData(text) => Cow::Borrowed(text),
            Self::Value(value) => value_text(value),
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// Renders a typed value the way markup stores it.
pub fn value_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Null => Cow::Borrowed(""),
        Value::Text(text) => Cow::Borrowed(text),
        Value::Number(n) => Cow::Owned(format_invariant_number(*n)),
        Value::DateTime(dt) => Cow::Owned(dt.format(MARKUP_DATETIME_FORMAT).to_string()),
    }
}

/// A named element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn push(&mut self, node: impl Into<Node>) {
        self.children.push(node.into());
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterates over the child elements, skipping leaves.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn has_elements(&self) -> bool {
        self.elements().next().is_some()
    }

    /// True when the element has no attributes and no non-blank content.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.children.iter().all(is_blank)
    }

    /// Concatenated text of all descendant leaves.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Element(element) => element.collect_text(out),
                leaf => out.push_str(&leaf.leaf_text()),
            }
        }
    }

    /// Returns the typed value of a single-leaf element.
    ///
    /// Plain text becomes [`Value::Text`]; an empty element has no value.
    pub fn value(&self) -> Option<Value> {
        match self.children.as_slice() {
            [Node::Value(value)] => Some(value.clone()),
            _ if self.is_empty() => None,
            _ => Some(Value::Text(self.text())),
        }
    }
}

fn is_blank(node: &Node) -> bool {
    match node {
        Node::Element(_) => false,
        Node::Value(value) => value.is_null(),
        Node::Text(text) | Node::CData(text) => text.is_empty(),
    }
}

/// A document with a single root element.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub root: Element,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self { root }
    }
}
