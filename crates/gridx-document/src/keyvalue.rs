//! Key/value-nested text (JSON) to and from the document tree.
//!
//! Object members become child elements, arrays become repeated elements,
//! `@name` members are attributes and `#text` is element text.

use serde_json::{Map, Number, Value as Json};

use gridx_model::Value;

use crate::error::{DocumentError, Result};
use crate::tree::{Document, Element, Node, value_text};

/// Name of the wrapper element used when the object has several members.
pub const WRAPPER_ROOT: &str = "root";

const ATTRIBUTE_PREFIX: char = '@';
const TEXT_MEMBER: &str = "#text";
const CDATA_MEMBER: &str = "#cdata-section";

/// Parses a JSON object into a document.
///
/// An object with a single, non-array member uses that member as the root
/// element; any other object is wrapped in a `root` element.
pub fn parse_key_value(text: &str) -> Result<Document> {
    let json: Json =
        serde_json::from_str(text.trim_start_matches('\u{feff}')).map_err(DocumentError::key_value)?;
    let Json::Object(members) = json else {
        return Err(DocumentError::key_value("top-level value must be an object"));
    };

    if members.len() == 1 && !members.values().any(Json::is_array) {
        let (name, body) = members
            .into_iter()
            .next()
            .ok_or_else(|| DocumentError::key_value("object has no members"))?;
        return Ok(Document::new(element_from(name, body)?));
    }

    let mut root = Element::new(WRAPPER_ROOT);
    append_members(&mut root, members)?;
    Ok(Document::new(root))
}

fn element_from(name: String, body: Json) -> Result<Element> {
    if name.is_empty() {
        return Err(DocumentError::key_value("member names must not be empty"));
    }
    let mut element = Element::new(name);
    match body {
        Json::Null => {}
        Json::Object(members) => append_members(&mut element, members)?,
        Json::Array(_) => {
            return Err(DocumentError::key_value(format!(
                "array '{}' cannot be an element body",
                element.name
            )));
        }
        scalar => {
            let text = scalar_text(&scalar);
            if !text.is_empty() {
                element.push(Node::Text(text));
            }
        }
    }
    Ok(element)
}

fn append_members(element: &mut Element, members: Map<String, Json>) -> Result<()> {
    for (key, value) in members {
        if let Some(attribute) = key.strip_prefix(ATTRIBUTE_PREFIX) {
            element
                .attributes
                .push((attribute.to_string(), scalar_text(&value)));
        } else if key == TEXT_MEMBER {
            element.push(Node::Text(scalar_text(&value)));
        } else if key == CDATA_MEMBER {
            element.push(Node::CData(scalar_text(&value)));
        } else {
            append_member(element, key, value)?;
        }
    }
    Ok(())
}

fn append_member(element: &mut Element, key: String, value: Json) -> Result<()> {
    match value {
        Json::Array(items) => {
            for item in items {
                append_member(element, key.clone(), item)?;
            }
        }
        other => element.push(element_from(key, other)?),
    }
    Ok(())
}

fn scalar_text(value: &Json) -> String {
    match value {
        Json::Null => String::new(),
        Json::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Renders a document as a compact JSON object `{root: body}`.
pub fn render_key_value(document: &Document) -> Result<String> {
    let mut members = Map::new();
    members.insert(document.root.name.clone(), element_body(&document.root));
    serde_json::to_string(&Json::Object(members)).map_err(DocumentError::key_value)
}

fn element_body(element: &Element) -> Json {
    if element.attributes.is_empty() && !element.has_elements() {
        return leaf_body(element);
    }

    let mut members = Map::new();
    for (key, value) in &element.attributes {
        members.insert(format!("{ATTRIBUTE_PREFIX}{key}"), Json::String(value.clone()));
    }

    let mut text = String::new();
    for child in &element.children {
        match child {
            Node::Element(child) => {
                let body = element_body(child);
                match members.get_mut(&child.name) {
                    Some(Json::Array(items)) => items.push(body),
                    Some(existing) => {
                        let first = existing.take();
                        *existing = Json::Array(vec![first, body]);
                    }
                    None => {
                        members.insert(child.name.clone(), body);
                    }
                }
            }
            leaf => text.push_str(&leaf.leaf_text()),
        }
    }
    if !text.trim().is_empty() {
        members.insert(TEXT_MEMBER.to_string(), Json::String(text));
    }
    Json::Object(members)
}

fn leaf_body(element: &Element) -> Json {
    match element.value() {
        None => Json::Null,
        Some(Value::Number(n)) => Number::from_f64(n).map_or_else(
            || Json::String(value_text(&Value::Number(n)).into_owned()),
            Json::Number,
        ),
        Some(value) => Json::String(value_text(&value).into_owned()),
    }
}
