//! Parsing XML text into an owned [`XmlNode`] tree.

use quick_xml::events::Event;
use quick_xml::Reader;
use roxmltree::{Document, Node, ParsingOptions};

use crate::config::{MAX_DOCUMENT_SIZE, MAX_ELEMENT_DEPTH, MAX_NODES};
use crate::error::{BindError, Result};

use super::node::{QName, XmlNode};

/// Parse UTF-8 encoded XML bytes.
///
/// # Errors
/// `InvalidInput` when the document exceeds [`MAX_DOCUMENT_SIZE`], nests
/// elements deeper than [`MAX_ELEMENT_DEPTH`] or is not valid UTF-8, `Parse`
/// when it is not well-formed.
pub fn parse(bytes: &[u8]) -> Result<XmlNode> {
    check_size(bytes.len())?;
    let text = std::str::from_utf8(bytes)
        .map_err(|e| BindError::InvalidInput(format!("document is not valid UTF-8: {e}")))?;
    parse_str(text)
}

/// Parse an XML string.
///
/// DTDs are rejected. Comments and processing instructions are dropped.
/// Text of an element without child elements is kept verbatim; in mixed
/// content, whitespace-only text between elements is not kept.
///
/// # Errors
/// `InvalidInput` when the document exceeds [`MAX_DOCUMENT_SIZE`] or nests
/// elements deeper than [`MAX_ELEMENT_DEPTH`], `Parse` when it is not
/// well-formed.
pub fn parse_str(text: &str) -> Result<XmlNode> {
    check_size(text.len())?;
    check_depth(text)?;

    let mut options = ParsingOptions::default();
    options.allow_dtd = false;
    options.nodes_limit = MAX_NODES;

    let doc = Document::parse_with_options(text, options)?;
    let root = doc.root_element();
    tracing::trace!(root = root.tag_name().name(), "Parsed XML document");
    Ok(convert(root, None))
}

fn check_size(len: usize) -> Result<()> {
    if len > MAX_DOCUMENT_SIZE {
        return Err(BindError::InvalidInput(format!(
            "document is {len} bytes, limit is {MAX_DOCUMENT_SIZE}"
        )));
    }
    Ok(())
}

/// Reject overly deep documents before building any tree.
///
/// Runs a flat quick-xml pass; syntax errors are left to roxmltree so that
/// malformed input is still reported as `Parse`.
fn check_depth(text: &str) -> Result<()> {
    let mut reader = Reader::from_str(text);
    let mut depth = 0usize;
    loop {
        match reader.read_event() {
            Ok(Event::Start(_)) => {
                depth += 1;
                if depth > MAX_ELEMENT_DEPTH {
                    return Err(BindError::InvalidInput(format!(
                        "elements are nested deeper than {MAX_ELEMENT_DEPTH} levels"
                    )));
                }
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) | Err(_) => return Ok(()),
            Ok(_) => {}
        }
    }
}

fn convert(node: Node<'_, '_>, parent: Option<Node<'_, '_>>) -> XmlNode {
    let tag = node.tag_name();
    let mut out = XmlNode::new(QName::new(tag.namespace(), tag.name()));

    out.namespaces = node
        .namespaces()
        .filter(|ns| ns.name() != Some("xml"))
        .filter(|ns| {
            parent.is_none_or(|p| {
                !p.namespaces()
                    .any(|outer| outer.name() == ns.name() && outer.uri() == ns.uri())
            })
        })
        .map(|ns| (ns.name().map(str::to_string), ns.uri().to_string()))
        .collect();

    out.attributes = node
        .attributes()
        .map(|attr| {
            (
                QName::new(attr.namespace(), attr.name()),
                attr.value().to_string(),
            )
        })
        .collect();

    let mut text = String::new();
    for child in node.children() {
        if child.is_element() {
            out.children.push(convert(child, Some(node)));
        } else if child.is_text() {
            let chunk = child.text().unwrap_or_default();
            match out.children.last_mut() {
                Some(last) => last.tail.get_or_insert_with(String::new).push_str(chunk),
                None => text.push_str(chunk),
            }
        }
    }

    if out.children.is_empty() {
        out.text = Some(text).filter(|t| !t.is_empty());
    } else {
        out.text = significant(Some(text));
        for child in &mut out.children {
            child.tail = significant(child.tail.take());
        }
    }
    out
}

/// Mixed content: whitespace-only runs are layout, not data.
fn significant(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}
