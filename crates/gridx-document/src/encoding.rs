//! Wire encodings of the document tree.
//!
//! Each encoding is a [`DocumentCodec`] that converts to and from the
//! canonical [`Document`]. Converting between two encodings always goes
//! through the tree, so a new encoding only needs its own codec.

use std::fmt;
use std::str::FromStr;

use crate::error::{DocumentError, Result};
use crate::keyvalue::{parse_key_value, render_key_value};
use crate::markup::{parse_markup, render_markup};
use crate::tree::{Document, Element, Node};

/// Converts one wire encoding to and from the document tree.
pub trait DocumentCodec: Send + Sync {
    fn decode(&self, text: &str) -> Result<Document>;

    fn encode(&self, document: &Document) -> Result<String>;
}

/// Markup-tree text (XML).
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupCodec;

impl DocumentCodec for MarkupCodec {
    fn decode(&self, text: &str) -> Result<Document> {
        parse_markup(text)
    }

    fn encode(&self, document: &Document) -> Result<String> {
        render_markup(document)
    }
}

/// Key/value-nested text (JSON).
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyValueCodec;

impl DocumentCodec for KeyValueCodec {
    fn decode(&self, text: &str) -> Result<Document> {
        parse_key_value(text)
    }

    fn encode(&self, document: &Document) -> Result<String> {
        render_key_value(document)
    }
}

/// Container element used by [`OpaqueCodec`].
pub const OPAQUE_ROOT: &str = "data";

/// Unparsed text carried in a single CDATA leaf.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpaqueCodec;

impl DocumentCodec for OpaqueCodec {
    /// Wraps the text in `<data>`, with backslashes removed and surrounding
    /// whitespace trimmed.
    fn decode(&self, text: &str) -> Result<Document> {
        let cleaned = text.replace('\\', "");
        let root = Element::new(OPAQUE_ROOT).with_child(Node::CData(cleaned.trim().to_string()));
        Ok(Document::new(root))
    }

    /// Returns the root's text, or the markup rendering when the root has
    /// child elements.
    fn encode(&self, document: &Document) -> Result<String> {
        if document.root.has_elements() {
            render_markup(document)
        } else {
            Ok(document.root.text())
        }
    }
}

/// The supported document encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DocumentEncoding {
    Markup,
    #[default]
    KeyValue,
    Opaque,
}

impl DocumentEncoding {
    pub const ALL: [DocumentEncoding; 3] = [Self::Markup, Self::KeyValue, Self::Opaque];

    /// Returns the configuration name (`XML`, `JSON`, `OTHER`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markup => "XML",
            Self::KeyValue => "JSON",
            Self::Opaque => "OTHER",
        }
    }

    pub fn codec(self) -> &'static dyn DocumentCodec {
        match self {
            Self::Markup => &MarkupCodec,
            Self::KeyValue => &KeyValueCodec,
            Self::Opaque => &OpaqueCodec,
        }
    }

    pub fn decode(self, text: &str) -> Result<Document> {
        self.codec().decode(text)
    }

    pub fn encode(self, document: &Document) -> Result<String> {
        self.codec().encode(document)
    }
}

impl fmt::Display for DocumentEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentEncoding {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "xml" | "markup" | "markuptree" => Ok(Self::Markup),
            "json" | "keyvalue" | "keyvaluenested" => Ok(Self::KeyValue),
            "other" | "opaque" => Ok(Self::Opaque),
            _ => Err(DocumentError::UnknownEncoding {
                name: s.trim().to_string(),
            }),
        }
    }
}

/// Converts text between two encodings through the document tree.
pub fn convert(text: &str, from: DocumentEncoding, to: DocumentEncoding) -> Result<String> {
    to.encode(&from.decode(text)?)
}
