//! Path resolution: where a field lives in an element tree.
//!
//! A [`Placement`] is computed per field and element. Deserialization uses
//! it to [`locate`] matching text or nodes; serialization uses it to
//! [`place`] rendered values, creating wrapper elements on demand.

use crate::error::{BindError, Result};
use crate::schema::{FieldDescriptor, SchemaDescriptor, WrappedEntity};
use crate::xml::{find_by_path, find_children, QName, XmlNode};

/// Final target of a binding, below any wrappers.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Target {
    Text,
    Attribute(QName),
    Element(QName),
}

/// Resolved location of a field relative to its model element.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Placement {
    /// Wrapper elements, outermost first.
    pub wrappers: Vec<QName>,
    pub target: Target,
}

impl Placement {
    /// Wrapper tags as a location suffix, e.g. `/address/lines`.
    pub fn wrapper_path(&self) -> String {
        self.wrappers
            .iter()
            .map(|name| format!("/{}", name.local))
            .collect()
    }

    /// Name of the target element, for element and raw bindings.
    pub fn element_name(&self) -> Option<&QName> {
        match &self.target {
            Target::Element(name) => Some(name),
            _ => None,
        }
    }
}

/// A value found in the tree.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Found<'a> {
    Text(&'a str),
    Node(&'a XmlNode),
}

/// Rendered value ready to be placed.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Rendered {
    Text(String),
    Node(XmlNode),
}

/// Compute where `field` lives below an element in namespace `element_ns`.
///
/// Wrappers and child elements without a declared namespace inherit it from
/// the element they are looked up in; a nested model element falls back to
/// the nested model's namespace first. Attributes have no namespace unless
/// declared or `ns_attrs` is set.
pub(crate) fn placement(
    field: &FieldDescriptor,
    nested: Option<&SchemaDescriptor>,
    element_ns: Option<&str>,
    ns_attrs: bool,
) -> Placement {
    let wrapper_ns = field.namespace.as_deref().or(element_ns);
    let wrappers: Vec<QName> = field
        .wrap_path
        .iter()
        .map(|segment| QName::new(wrapper_ns, segment.as_str()))
        .collect();
    let container_ns = if wrappers.is_empty() {
        element_ns
    } else {
        wrapper_ns
    };
    let tag = field.tag.as_deref().unwrap_or(&field.name);

    let target = match field.target() {
        WrappedEntity::Text => Target::Text,
        WrappedEntity::Attribute => {
            let ns = field
                .namespace
                .as_deref()
                .or(if ns_attrs { container_ns } else { None });
            Target::Attribute(QName::new(ns, tag))
        }
        WrappedEntity::Element => {
            let ns = field
                .namespace
                .as_deref()
                .or(nested.and_then(|schema| schema.namespace.as_deref()))
                .or(container_ns);
            Target::Element(QName::new(ns, tag))
        }
    };

    Placement { wrappers, target }
}

/// Collect every match of `placement` below `node`, in document order.
///
/// A missing wrapper or attribute yields no matches. A present element
/// without text yields empty text, like an empty element.
pub(crate) fn locate<'a>(node: &'a XmlNode, placement: &Placement) -> Vec<Found<'a>> {
    let Some(container) = find_by_path(node, &placement.wrappers) else {
        return Vec::new();
    };
    match &placement.target {
        Target::Text => vec![Found::Text(container.text.as_deref().unwrap_or_default())],
        Target::Attribute(name) => container.attribute(name).map(Found::Text).into_iter().collect(),
        Target::Element(name) => find_children(container, name).map(Found::Node).collect(),
    }
}

/// A rendered value bound to its final position.
enum Placed {
    Text(String),
    Attribute(QName, String),
    Child(XmlNode),
}

/// Place rendered values below `parent`.
///
/// Nothing is created when `items` is empty (or becomes empty after
/// `skip_empty` filtering), so absent values never leave empty wrappers.
///
/// # Errors
/// `InvalidFieldValue` if an element is rendered for a text or attribute
/// target.
pub(crate) fn place(
    parent: &mut XmlNode,
    placement: &Placement,
    field: &FieldDescriptor,
    items: Vec<Rendered>,
    skip_empty: bool,
) -> Result<()> {
    let mut placed = Vec::with_capacity(items.len());
    for item in items {
        let next = match (item, &placement.target) {
            (Rendered::Text(text), Target::Text) => Placed::Text(text),
            (Rendered::Text(text), Target::Attribute(name)) => Placed::Attribute(name.clone(), text),
            (Rendered::Text(text), Target::Element(name)) => {
                let mut child = XmlNode::new(name.clone());
                child.text = Some(text).filter(|t| !t.is_empty());
                Placed::Child(child)
            }
            (Rendered::Node(node), Target::Element(_)) => Placed::Child(node),
            (Rendered::Node(_), Target::Text | Target::Attribute(_)) => {
                return Err(BindError::invalid("expected text, found an element")
                    .prefixed(&field.name));
            }
        };
        if skip_empty && matches!(&next, Placed::Child(node) if node.is_empty()) {
            continue;
        }
        placed.push(next);
    }
    if placed.is_empty() {
        return Ok(());
    }

    let container = placement
        .wrappers
        .iter()
        .fold(parent, |current, name| wrapper_mut(current, name));

    for item in placed {
        match item {
            Placed::Text(text) => container.text = Some(text),
            Placed::Attribute(name, value) => container.set_attribute(name, value),
            Placed::Child(mut node) => {
                if !field.nsmap.is_empty() {
                    node.namespaces.extend(field.nsmap.iter().cloned());
                }
                container.children.push(node);
            }
        }
    }
    Ok(())
}

/// First child named `name`, created at the end if missing.
fn wrapper_mut<'a>(parent: &'a mut XmlNode, name: &QName) -> &'a mut XmlNode {
    let index = match parent.children.iter().position(|c| c.name == *name) {
        Some(index) => index,
        None => {
            parent.children.push(XmlNode::new(name.clone()));
            parent.children.len() - 1
        }
    };
    &mut parent.children[index]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BindingKind, ValueType};
    use crate::validate::ScalarType;
    use crate::xml::parse_str;
    use pretty_assertions::assert_eq;

    fn field(kind: BindingKind, tag: Option<&str>) -> FieldDescriptor {
        FieldDescriptor {
            name: "f".to_string(),
            kind,
            tag: tag.map(str::to_string),
            namespace: None,
            nsmap: Vec::new(),
            wrap_path: Vec::new(),
            entity: None,
            collection: false,
            optional: false,
            default: None,
            value_type: ValueType::Scalar(ScalarType::String),
        }
    }

    fn wrapped(path: &[&str], entity: WrappedEntity, tag: Option<&str>) -> FieldDescriptor {
        let mut f = field(BindingKind::Wrapped, tag);
        f.wrap_path = path.iter().map(|s| s.to_string()).collect();
        f.entity = Some(entity);
        f
    }

    fn texts<'a>(found: &[Found<'a>]) -> Vec<&'a str> {
        found
            .iter()
            .copied()
            .map(|f| match f {
                Found::Text(t) => t,
                Found::Node(n) => n.text.as_deref().unwrap_or_default(),
            })
            .collect()
    }

    #[test]
    fn test_locate_attribute_and_text() {
        let root = parse_str(r#"<a id="1">body</a>"#).unwrap();

        let p = placement(&field(BindingKind::Attribute, Some("id")), None, None, false);
        assert_eq!(texts(&locate(&root, &p)), vec!["1"]);

        let p = placement(&field(BindingKind::Text, None), None, None, false);
        assert_eq!(texts(&locate(&root, &p)), vec!["body"]);

        let p = placement(&field(BindingKind::Attribute, Some("missing")), None, None, false);
        assert!(locate(&root, &p).is_empty());

        let empty = parse_str(r#"<a id="1"/>"#).unwrap();
        let p = placement(&field(BindingKind::Text, None), None, None, false);
        assert_eq!(texts(&locate(&empty, &p)), vec![""]);
    }

    #[test]
    fn test_locate_elements_in_order() {
        let root = parse_str("<a><i>1</i><x/><i>2</i><i>3</i></a>").unwrap();
        let p = placement(&field(BindingKind::Element, Some("i")), None, None, false);
        assert_eq!(texts(&locate(&root, &p)), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_locate_wrapped_text_attribute_and_elements() {
        let root =
            parse_str(r#"<a><b><c code="x">deep</c></b><list><i>1</i><i>2</i></list></a>"#)
                .unwrap();

        let p = placement(&wrapped(&["b", "c"], WrappedEntity::Text, None), None, None, false);
        assert_eq!(texts(&locate(&root, &p)), vec!["deep"]);

        let p = placement(
            &wrapped(&["b", "c"], WrappedEntity::Attribute, Some("code")),
            None,
            None,
            false,
        );
        assert_eq!(texts(&locate(&root, &p)), vec!["x"]);

        let p = placement(&wrapped(&["list"], WrappedEntity::Element, Some("i")), None, None, false);
        assert_eq!(texts(&locate(&root, &p)), vec!["1", "2"]);

        let p = placement(&wrapped(&["nope", "c"], WrappedEntity::Text, None), None, None, false);
        assert!(locate(&root, &p).is_empty());
    }

    #[test]
    fn test_place_rejects_element_for_text_target() {
        let mut root = XmlNode::new(QName::local("a"));
        let f = field(BindingKind::Text, None);
        let items = vec![Rendered::Node(XmlNode::new(QName::local("x")))];

        let err = place(&mut root, &placement(&f, None, None, false), &f, items, false).unwrap_err();
        assert_eq!(err.path(), Some("f"));
        assert!(root.is_empty());
    }

    #[test]
    fn test_namespace_inheritance() {
        let root = parse_str(r#"<a xmlns="urn:a" id="1"><b>x</b></a>"#).unwrap();

        let p = placement(&field(BindingKind::Element, Some("b")), None, root.name.ns(), false);
        assert_eq!(p.target, Target::Element(QName::new(Some("urn:a"), "b")));
        assert_eq!(locate(&root, &p).len(), 1);

        let p = placement(&field(BindingKind::Attribute, Some("id")), None, root.name.ns(), false);
        assert_eq!(p.target, Target::Attribute(QName::local("id")));

        let p = placement(&field(BindingKind::Attribute, Some("id")), None, root.name.ns(), true);
        assert_eq!(p.target, Target::Attribute(QName::new(Some("urn:a"), "id")));
    }

    #[test]
    fn test_place_creates_and_reuses_wrappers() {
        let mut root = XmlNode::new(QName::local("a"));
        let city = wrapped(&["address", "city"], WrappedEntity::Text, None);
        let zip = wrapped(&["address"], WrappedEntity::Attribute, Some("zip"));

        let p = placement(&city, None, None, false);
        place(&mut root, &p, &city, vec![Rendered::Text("Utrecht".into())], false).unwrap();
        let p = placement(&zip, None, None, false);
        place(&mut root, &p, &zip, vec![Rendered::Text("3511".into())], false).unwrap();

        assert_eq!(root.children.len(), 1);
        let address = &root.children[0];
        assert_eq!(address.attribute(&QName::local("zip")), Some("3511"));
        assert_eq!(address.children[0].text.as_deref(), Some("Utrecht"));
    }

    #[test]
    fn test_place_nothing_creates_no_wrapper() {
        let mut root = XmlNode::new(QName::local("a"));
        let f = wrapped(&["w"], WrappedEntity::Text, None);
        place(&mut root, &placement(&f, None, None, false), &f, Vec::new(), false).unwrap();
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_place_skip_empty() {
        let mut root = XmlNode::new(QName::local("a"));
        let f = wrapped(&["w"], WrappedEntity::Element, Some("i"));
        let items = vec![Rendered::Text(String::new())];

        place(&mut root, &placement(&f, None, None, false), &f, items.clone(), true).unwrap();
        assert!(root.children.is_empty());

        place(&mut root, &placement(&f, None, None, false), &f, items, false).unwrap();
        assert_eq!(root.children[0].children, vec![XmlNode::new(QName::local("i"))]);
    }
}
