//! The node model shared by the XPath engine, the validators, and the
//! XSLT interpreter.
//!
//! Attributes need their own variant because roxmltree treats them as
//! data on elements, not as navigable nodes in the tree.

use roxmltree::Node;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// Node kinds of the XPath 1.0 data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Element,
    Attribute,
    Text,
    Comment,
    ProcessingInstruction,
}

/// A node in a parsed document: either a tree node (root, element, text,
/// comment, PI) or an attribute addressed by its parent element and index.
#[derive(Debug, Clone, Copy)]
pub enum XmlNode<'a, 'input> {
    Tree(Node<'a, 'input>),
    Attribute {
        parent: Node<'a, 'input>,
        index: usize,
    },
}

impl<'a, 'input: 'a> XmlNode<'a, 'input> {
    pub fn kind(&self) -> NodeKind {
        match self {
            XmlNode::Tree(node) => {
                if node.is_root() {
                    NodeKind::Root
                } else if node.is_element() {
                    NodeKind::Element
                } else if node.is_text() {
                    NodeKind::Text
                } else if node.is_comment() {
                    NodeKind::Comment
                } else if node.is_pi() {
                    NodeKind::ProcessingInstruction
                } else {
                    NodeKind::Element
                }
            }
            XmlNode::Attribute { .. } => NodeKind::Attribute,
        }
    }

    pub fn is_element(&self) -> bool {
        self.kind() == NodeKind::Element
    }

    /// The underlying tree node, if this is not an attribute.
    pub fn tree_node(&self) -> Option<Node<'a, 'input>> {
        match self {
            XmlNode::Tree(node) => Some(*node),
            XmlNode::Attribute { .. } => None,
        }
    }

    fn attribute(&self) -> Option<roxmltree::Attribute<'a, 'input>> {
        match self {
            XmlNode::Tree(_) => None,
            XmlNode::Attribute { parent, index } => parent.attributes().nth(*index),
        }
    }

    /// The local part of the node's name. `None` for unnamed node kinds.
    /// For a processing instruction, this is its target.
    pub fn local_name(&self) -> Option<&'a str> {
        match self {
            XmlNode::Tree(node) => {
                if node.is_element() {
                    Some(node.tag_name().name())
                } else if node.is_pi() {
                    node.pi().map(|pi| pi.target)
                } else {
                    None
                }
            }
            XmlNode::Attribute { .. } => self.attribute().map(|attr| attr.name()),
        }
    }

    /// The namespace URI of an element or attribute, if any.
    pub fn namespace_uri(&self) -> Option<&'a str> {
        match self {
            XmlNode::Tree(node) => {
                if node.is_element() {
                    node.tag_name().namespace()
                } else {
                    None
                }
            }
            XmlNode::Attribute { .. } => self.attribute().and_then(|attr| attr.namespace()),
        }
    }

    /// The name as it would appear in source: `prefix:local` when the
    /// node's namespace is bound to a non-empty prefix, plain local name
    /// otherwise (default-namespace elements render unprefixed).
    pub fn qualified_name(&self) -> Option<String> {
        let local = self.local_name()?;
        let scope = match self {
            XmlNode::Tree(node) => *node,
            XmlNode::Attribute { parent, .. } => *parent,
        };
        match self.namespace_uri() {
            Some(uri) => match scope.lookup_prefix(uri) {
                Some(prefix) if !prefix.is_empty() => Some(format!("{prefix}:{local}")),
                _ => Some(local.to_string()),
            },
            None => Some(local.to_string()),
        }
    }

    /// The XPath 1.0 string value of the node.
    pub fn string_value(&self) -> String {
        match self {
            XmlNode::Tree(node) => {
                if node.is_text() || node.is_comment() {
                    node.text().unwrap_or("").to_string()
                } else if node.is_element() || node.is_root() {
                    node.descendants()
                        .filter(|n| n.is_text())
                        .filter_map(|n| n.text())
                        .collect()
                } else if node.is_pi() {
                    node.pi().and_then(|pi| pi.value).unwrap_or("").to_string()
                } else {
                    String::new()
                }
            }
            XmlNode::Attribute { .. } => self
                .attribute()
                .map(|attr| attr.value().to_string())
                .unwrap_or_default(),
        }
    }

    pub fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        match self {
            XmlNode::Tree(node) if node.is_element() => {
                let parent = *node;
                let count = node.attributes().len();
                Box::new((0..count).map(move |index| XmlNode::Attribute { parent, index }))
            }
            _ => Box::new(std::iter::empty()),
        }
    }

    pub fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        match self {
            XmlNode::Tree(node) => Box::new(node.children().map(XmlNode::Tree)),
            XmlNode::Attribute { .. } => Box::new(std::iter::empty()),
        }
    }

    pub fn element_children(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        Box::new(self.children().filter(|n| n.is_element()))
    }

    pub fn has_element_children(&self) -> bool {
        self.element_children().next().is_some()
    }

    pub fn parent(&self) -> Option<Self> {
        match self {
            XmlNode::Tree(node) => node.parent().map(XmlNode::Tree),
            XmlNode::Attribute { parent, .. } => Some(XmlNode::Tree(*parent)),
        }
    }

    /// The value of the named (no-namespace) attribute on an element.
    pub fn attribute_value(&self, name: &str) -> Option<&'a str> {
        match self {
            XmlNode::Tree(node) => node.attribute(name),
            XmlNode::Attribute { .. } => None,
        }
    }
}

impl PartialEq for XmlNode<'_, '_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (XmlNode::Tree(a), XmlNode::Tree(b)) => a.id() == b.id(),
            (
                XmlNode::Attribute {
                    parent: p1,
                    index: i1,
                },
                XmlNode::Attribute {
                    parent: p2,
                    index: i2,
                },
            ) => p1.id() == p2.id() && i1 == i2,
            _ => false,
        }
    }
}

impl Eq for XmlNode<'_, '_> {}

impl PartialOrd for XmlNode<'_, '_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Document order. An element sorts before its own attributes.
impl Ord for XmlNode<'_, '_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (XmlNode::Tree(a), XmlNode::Tree(b)) => a.id().get().cmp(&b.id().get()),
            (
                XmlNode::Attribute {
                    parent: p1,
                    index: i1,
                },
                XmlNode::Attribute {
                    parent: p2,
                    index: i2,
                },
            ) => match p1.id().get().cmp(&p2.id().get()) {
                Ordering::Equal => i1.cmp(i2),
                order => order,
            },
            (XmlNode::Tree(e), XmlNode::Attribute { parent, .. }) => {
                if e.id() == parent.id() {
                    Ordering::Less
                } else {
                    e.id().get().cmp(&parent.id().get())
                }
            }
            (XmlNode::Attribute { parent, .. }, XmlNode::Tree(e)) => {
                if parent.id() == e.id() {
                    Ordering::Greater
                } else {
                    parent.id().get().cmp(&e.id().get())
                }
            }
        }
    }
}

impl Hash for XmlNode<'_, '_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            XmlNode::Tree(node) => {
                0u8.hash(state);
                node.id().hash(state);
            }
            XmlNode::Attribute { parent, index } => {
                1u8.hash(state);
                parent.id().hash(state);
                index.hash(state);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::XmlDocument;

    #[test]
    fn test_kinds_and_names() {
        let xml = r#"<root><item id="1">Text<!-- note --></item></root>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        let root = doc.root();
        assert_eq!(root.kind(), NodeKind::Root);

        let root_el = doc.root_element();
        assert_eq!(root_el.kind(), NodeKind::Element);
        assert_eq!(root_el.local_name(), Some("root"));

        let item = root_el.element_children().next().unwrap();
        assert_eq!(item.qualified_name().as_deref(), Some("item"));
        assert_eq!(item.string_value(), "Text");

        let attrs: Vec<_> = item.attributes().collect();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].kind(), NodeKind::Attribute);
        assert_eq!(attrs[0].local_name(), Some("id"));
        assert_eq!(attrs[0].string_value(), "1");
        assert_eq!(attrs[0].parent(), Some(item));

        let comment = item
            .children()
            .find(|n| n.kind() == NodeKind::Comment)
            .unwrap();
        assert_eq!(comment.string_value(), " note ");
    }

    #[test]
    fn test_qualified_name_with_prefix() {
        let xml = r#"<bk:books xmlns:bk="urn:books"><bk:book/></bk:books>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        let root_el = doc.root_element();
        assert_eq!(root_el.local_name(), Some("books"));
        assert_eq!(root_el.namespace_uri(), Some("urn:books"));
        assert_eq!(root_el.qualified_name().as_deref(), Some("bk:books"));
    }

    #[test]
    fn test_qualified_name_default_namespace() {
        let xml = r#"<books xmlns="urn:books"/>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        let root_el = doc.root_element();
        assert_eq!(root_el.namespace_uri(), Some("urn:books"));
        assert_eq!(root_el.qualified_name().as_deref(), Some("books"));
    }

    #[test]
    fn test_document_order() {
        let xml = r#"<root><a/><b x="1"/></root>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        let root_el = doc.root_element();
        let children: Vec<_> = root_el.element_children().collect();
        assert!(children[0] < children[1]);
        let attr = children[1].attributes().next().unwrap();
        assert!(children[1] < attr);
        assert!(children[0] < attr);
    }
}
