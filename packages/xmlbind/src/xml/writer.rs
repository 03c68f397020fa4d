//! Rendering an [`XmlNode`] tree to bytes.
//!
//! Prefixes are chosen at write time. Declarations recorded on a node are
//! emitted as given; any namespace still unbound when an element or
//! attribute needs it is declared on that element, preferring the default
//! namespace for elements and generated `ns0`, `ns1`, ... prefixes otherwise.

use std::collections::HashMap;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::config::{WriteOptions, XML_NAMESPACE};
use crate::error::Result;

use super::node::{QName, XmlNode};

/// In-scope prefix bindings; `None` is the default namespace.
type Scope = HashMap<Option<String>, String>;

/// Render a tree as an XML document.
///
/// # Errors
/// Returns an error if the underlying writer fails.
pub fn write(node: &XmlNode, options: &WriteOptions) -> Result<Vec<u8>> {
    let mut writer = match options.indent {
        Some(width) => Writer::new_with_indent(Vec::new(), b' ', width),
        None => Writer::new(Vec::new()),
    };
    if options.declaration {
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    }
    write_node(&mut writer, node, &Scope::new())?;
    Ok(writer.into_inner())
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode, parent: &Scope) -> Result<()> {
    let mut scope = parent.clone();
    let mut declared: Vec<(Option<String>, String)> = Vec::new();

    for (prefix, uri) in &node.namespaces {
        bind(&mut scope, &mut declared, prefix.clone(), uri);
    }

    let name = element_name(&node.name, &mut scope, &mut declared);
    let attributes: Vec<(String, &str)> = node
        .attributes
        .iter()
        .map(|(qname, value)| {
            (
                attribute_name(qname, &mut scope, &mut declared),
                value.as_str(),
            )
        })
        .collect();

    let mut start = BytesStart::new(name.as_str());
    for (prefix, uri) in &declared {
        match prefix {
            Some(p) => start.push_attribute((format!("xmlns:{p}").as_str(), uri.as_str())),
            None => start.push_attribute(("xmlns", uri.as_str())),
        }
    }
    for (attr, value) in &attributes {
        start.push_attribute((attr.as_str(), *value));
    }

    if node.children.is_empty() && node.text.is_none() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if let Some(text) = &node.text {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    for child in &node.children {
        write_node(writer, child, &scope)?;
        if let Some(tail) = &child.tail {
            writer.write_event(Event::Text(BytesText::new(tail)))?;
        }
    }
    writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
    Ok(())
}

fn bind(
    scope: &mut Scope,
    declared: &mut Vec<(Option<String>, String)>,
    prefix: Option<String>,
    uri: &str,
) {
    if scope.get(&prefix).map(String::as_str) == Some(uri) {
        return;
    }
    scope.insert(prefix.clone(), uri.to_string());
    declared.retain(|(p, _)| *p != prefix);
    declared.push((prefix, uri.to_string()));
}

/// Smallest non-empty prefix bound to `uri`, for deterministic output.
fn existing_prefix(scope: &Scope, uri: &str) -> Option<String> {
    scope
        .iter()
        .filter(|(_, bound)| bound.as_str() == uri)
        .filter_map(|(prefix, _)| prefix.clone())
        .min()
}

fn generate_prefix(
    scope: &mut Scope,
    declared: &mut Vec<(Option<String>, String)>,
    uri: &str,
) -> String {
    let mut n = 0;
    let prefix = loop {
        let candidate = format!("ns{n}");
        if !scope.contains_key(&Some(candidate.clone())) {
            break candidate;
        }
        n += 1;
    };
    bind(scope, declared, Some(prefix.clone()), uri);
    prefix
}

fn element_name(
    name: &QName,
    scope: &mut Scope,
    declared: &mut Vec<(Option<String>, String)>,
) -> String {
    let default = scope.get(&None).cloned().unwrap_or_default();
    let Some(uri) = name.ns() else {
        if !default.is_empty() {
            bind(scope, declared, None, "");
        }
        return name.local.clone();
    };

    if uri == XML_NAMESPACE {
        return format!("xml:{}", name.local);
    }
    if default == uri {
        return name.local.clone();
    }
    if let Some(prefix) = existing_prefix(scope, uri) {
        return format!("{prefix}:{}", name.local);
    }
    if default.is_empty() {
        bind(scope, declared, None, uri);
        return name.local.clone();
    }
    let prefix = generate_prefix(scope, declared, uri);
    format!("{prefix}:{}", name.local)
}

fn attribute_name(
    name: &QName,
    scope: &mut Scope,
    declared: &mut Vec<(Option<String>, String)>,
) -> String {
    let Some(uri) = name.ns() else {
        return name.local.clone();
    };
    if uri == XML_NAMESPACE {
        return format!("xml:{}", name.local);
    }
    let prefix = match existing_prefix(scope, uri) {
        Some(prefix) => prefix,
        None => generate_prefix(scope, declared, uri),
    };
    format!("{prefix}:{}", name.local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_str;
    use pretty_assertions::assert_eq;

    fn render(node: &XmlNode) -> String {
        String::from_utf8(write(node, &WriteOptions::default()).unwrap()).unwrap()
    }

    #[test]
    fn test_write_simple_tree() {
        let node = XmlNode::new(QName::local("order"))
            .with_attribute(QName::local("id"), "7")
            .with_child(XmlNode::new(QName::local("note")).with_text("a & b"))
            .with_child(XmlNode::new(QName::local("empty")));

        assert_eq!(
            render(&node),
            r#"<order id="7"><note>a &amp; b</note><empty/></order>"#
        );
    }

    #[test]
    fn test_write_declaration() {
        let node = XmlNode::new(QName::local("a"));
        let out = write(&node, &WriteOptions::default().with_declaration(true)).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"<?xml version="1.0" encoding="UTF-8"?><a/>"#
        );
    }

    #[test]
    fn test_undeclared_namespace_becomes_default() {
        let node = XmlNode::new(QName::new(Some("urn:a"), "root"))
            .with_child(XmlNode::new(QName::new(Some("urn:a"), "inner")))
            .with_child(XmlNode::new(QName::local("plain")));

        assert_eq!(
            render(&node),
            r#"<root xmlns="urn:a"><inner/><plain xmlns=""/></root>"#
        );
    }

    #[test]
    fn test_declared_prefix_is_used() {
        let node = XmlNode::new(QName::new(Some("urn:a"), "root"))
            .with_namespace(Some("a"), "urn:a")
            .with_attribute(QName::new(Some("urn:b"), "id"), "1");

        assert_eq!(
            render(&node),
            r#"<a:root xmlns:a="urn:a" xmlns:ns0="urn:b" ns0:id="1"/>"#
        );
    }

    #[test]
    fn test_second_namespace_gets_generated_prefix() {
        let node = XmlNode::new(QName::new(Some("urn:a"), "root"))
            .with_child(XmlNode::new(QName::new(Some("urn:b"), "child")));

        assert_eq!(
            render(&node),
            r#"<root xmlns="urn:a"><ns0:child xmlns:ns0="urn:b"/></root>"#
        );
    }

    #[test]
    fn test_parsed_document_survives_rewrite() {
        let xml = r#"<x:a xmlns:x="urn:x"><x:b x:id="1">text<c/>tail</x:b></x:a>"#;
        let tree = parse_str(xml).unwrap();
        assert_eq!(render(&tree), xml);

        let mixed = r#"<a xmlns="urn:d" xmlns:x="urn:x"><x:b>t<c/></x:b></a>"#;
        let tree = parse_str(mixed).unwrap();
        assert_eq!(parse_str(&render(&tree)).unwrap(), tree);
    }

    #[test]
    fn test_xml_namespace_attribute() {
        let node = XmlNode::new(QName::local("p"))
            .with_attribute(QName::new(Some(XML_NAMESPACE), "lang"), "nl");
        assert_eq!(render(&node), r#"<p xml:lang="nl"/>"#);
    }
}
