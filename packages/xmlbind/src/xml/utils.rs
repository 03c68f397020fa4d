//! Utility functions for navigating owned element trees.

use super::node::{QName, XmlNode};

/// Find the first child element with the given name.
///
/// # Examples
/// ```
/// use xmlbind::xml::{find_child, parse_str, QName};
///
/// let root = parse_str("<root><child1/><child2/></root>").unwrap();
/// assert!(find_child(&root, &QName::local("child1")).is_some());
/// assert!(find_child(&root, &QName::local("missing")).is_none());
/// ```
#[must_use]
pub fn find_child<'a>(node: &'a XmlNode, name: &QName) -> Option<&'a XmlNode> {
    node.children.iter().find(|child| child.name == *name)
}

/// Find all child elements with the given name, in document order.
///
/// # Examples
/// ```
/// use xmlbind::xml::{find_children, parse_str, QName};
///
/// let root = parse_str("<root><item>1</item><item>2</item><other/></root>").unwrap();
/// let name = QName::local("item");
/// assert_eq!(find_children(&root, &name).count(), 2);
/// ```
pub fn find_children<'a, 'b>(
    node: &'a XmlNode,
    name: &'b QName,
) -> impl Iterator<Item = &'a XmlNode> + 'b
where
    'a: 'b,
{
    node.children.iter().filter(move |child| child.name == *name)
}

/// Descend through a path of element names, taking the first match at each level.
///
/// Returns `None` as soon as one step has no match.
#[must_use]
pub fn find_by_path<'a>(node: &'a XmlNode, path: &[QName]) -> Option<&'a XmlNode> {
    path.iter()
        .try_fold(node, |current, name| find_child(current, name))
}
