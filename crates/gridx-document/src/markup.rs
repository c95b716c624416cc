//! Markup text (XML) to and from the document tree.

use std::borrow::Cow;
use std::io::Write;

use quick_xml::Writer;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;

use crate::error::{DocumentError, Result};
use crate::tree::{Document, Element, Node};

/// Parses markup text into a document.
///
/// The declaration, comments, processing instructions and whitespace-only
/// text are ignored. Entities and character references are resolved.
pub fn parse_markup(text: &str) -> Result<Document> {
    let mut reader = Reader::from_str(text.trim_start_matches('\u{feff}'));
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut pending = String::new();

    loop {
        match reader.read_event().map_err(DocumentError::markup)? {
            Event::Start(start) => {
                flush_text(&mut stack, &mut pending)?;
                stack.push(element_from(&start)?);
            }
            Event::Empty(start) => {
                flush_text(&mut stack, &mut pending)?;
                attach(&mut stack, &mut root, element_from(&start)?)?;
            }
            Event::End(_) => {
                flush_text(&mut stack, &mut pending)?;
                let element = stack
                    .pop()
                    .ok_or_else(|| DocumentError::markup("unexpected closing tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let raw = std::str::from_utf8(&text).map_err(DocumentError::markup)?;
                pending.push_str(&unescape(raw).map_err(DocumentError::markup)?);
            }
            Event::GeneralRef(reference) => {
                let name = std::str::from_utf8(&reference).map_err(DocumentError::markup)?;
                let entity = format!("&{name};");
                let resolved = unescape(&entity).map_err(DocumentError::markup)?;
                pending.push_str(&resolved);
            }
            Event::CData(data) => {
                flush_text(&mut stack, &mut pending)?;
                let text = std::str::from_utf8(&data).map_err(DocumentError::markup)?;
                let parent = stack
                    .last_mut()
                    .ok_or_else(|| DocumentError::markup("CDATA outside the root element"))?;
                parent.push(Node::CData(text.to_string()));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(DocumentError::markup(format!(
            "element '{}' is not closed",
            open.name
        )));
    }
    root.map(Document::new)
        .ok_or_else(|| DocumentError::markup("document has no root element"))
}

fn element_from(start: &BytesStart<'_>) -> Result<Element> {
    let qname = start.name();
    let name = std::str::from_utf8(qname.as_ref()).map_err(DocumentError::markup)?;
    let mut element = Element::new(decode_name(name));
    for attribute in start.attributes() {
        let attribute = attribute.map_err(DocumentError::markup)?;
        let key = std::str::from_utf8(attribute.key.as_ref()).map_err(DocumentError::markup)?;
        let raw = std::str::from_utf8(&attribute.value).map_err(DocumentError::markup)?;
        let value = unescape(raw).map_err(DocumentError::markup)?;
        element
            .attributes
            .push((decode_name(key).into_owned(), value.into_owned()));
    }
    Ok(element)
}

fn flush_text(stack: &mut [Element], pending: &mut String) -> Result<()> {
    if pending.trim().is_empty() {
        pending.clear();
        return Ok(());
    }
    let parent = stack
        .last_mut()
        .ok_or_else(|| DocumentError::markup("text outside the root element"))?;
    parent.push(Node::Text(std::mem::take(pending)));
    Ok(())
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(DocumentError::markup("document has more than one root element"));
    }
    *root = Some(element);
    Ok(())
}

/// Renders a document as markup text, indented by two spaces.
pub fn render_markup(document: &Document) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write_element(&mut writer, &document.root)?;
    String::from_utf8(writer.into_inner()).map_err(DocumentError::markup)
}

/// Renders a document as markup text on a single line.
pub fn render_markup_compact(document: &Document) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    write_element(&mut writer, &document.root)?;
    String::from_utf8(writer.into_inner()).map_err(DocumentError::markup)
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> Result<()> {
    let name = encode_name(&element.name);
    let mut start = BytesStart::new(name.as_ref());
    for (key, value) in &element.attributes {
        start.push_attribute((encode_name(key).as_ref(), value.as_str()));
    }

    if element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(DocumentError::markup);
    }

    writer
        .write_event(Event::Start(start))
        .map_err(DocumentError::markup)?;
    for child in &element.children {
        match child {
            Node::Element(child) => write_element(writer, child)?,
            Node::CData(text) => write_cdata(writer, text)?,
            leaf => writer
                .write_event(Event::Text(BytesText::new(&leaf.leaf_text())))
                .map_err(DocumentError::markup)?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(name.as_ref())))
        .map_err(DocumentError::markup)
}

/// Writes CDATA, splitting any `]]>` across two sections.
fn write_cdata<W: Write>(writer: &mut Writer<W>, text: &str) -> Result<()> {
    let mut rest = text;
    while let Some(pos) = rest.find("]]>") {
        let (head, tail) = rest.split_at(pos + 2);
        writer
            .write_event(Event::CData(BytesCData::new(head)))
            .map_err(DocumentError::markup)?;
        rest = tail;
    }
    writer
        .write_event(Event::CData(BytesCData::new(rest)))
        .map_err(DocumentError::markup)
}

/// Escapes characters that may not appear in a markup name as `_xHHHH_`
/// (`_xHHHHHHHH_` outside the basic plane). An underscore that would read
/// as the start of such an escape is itself escaped.
pub(crate) fn encode_name(name: &str) -> Cow<'_, str> {
    let clean = name
        .chars()
        .enumerate()
        .all(|(i, c)| if i == 0 { is_name_start_char(c) } else { is_name_char(c) });
    if clean && !name.contains("_x") {
        return Cow::Borrowed(name);
    }

    let mut out = String::with_capacity(name.len() + 8);
    for (i, (at, c)) in name.char_indices().enumerate() {
        let allowed = if i == 0 { is_name_start_char(c) } else { is_name_char(c) };
        if c == '_' && name_escape(&name[at..]).is_some() {
            out.push_str("_x005F_");
        } else if allowed {
            out.push(c);
        } else if u32::from(c) > 0xFFFF {
            out.push_str(&format!("_x{:08X}_", u32::from(c)));
        } else {
            out.push_str(&format!("_x{:04X}_", u32::from(c)));
        }
    }
    Cow::Owned(out)
}

/// Reverses [`encode_name`].
pub(crate) fn decode_name(name: &str) -> Cow<'_, str> {
    if !name.contains("_x") {
        return Cow::Borrowed(name);
    }

    let mut out = String::with_capacity(name.len());
    let mut rest = name;
    while let Some(pos) = rest.find("_x") {
        out.push_str(&rest[..pos]);
        match name_escape(&rest[pos..]) {
            Some((c, len)) => {
                out.push(c);
                rest = &rest[pos + len..];
            }
            None => {
                out.push('_');
                rest = &rest[pos + 1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Reads a `_xHHHH_` or `_xHHHHHHHH_` escape at the start of `text`,
/// returning the character and the escape's length in bytes.
fn name_escape(text: &str) -> Option<(char, usize)> {
    let hex = text.strip_prefix("_x")?;
    [4, 8].into_iter().find_map(|width| {
        let digits = hex.get(..width)?;
        if hex.as_bytes().get(width) != Some(&b'_')
            || !digits.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return None;
        }
        let c = u32::from_str_radix(digits, 16).ok().and_then(char::from_u32)?;
        Some((c, width + 3))
    })
}

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}'
            | '\u{300}'..='\u{36F}'
            | '\u{203F}'..='\u{2040}')
}
