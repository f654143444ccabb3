//! Serialization back to markup: compact (for query results) and
//! pretty-printed (for the formatter).
//!
//! Formatting never mutates a document; it produces new text that the
//! caller re-parses.

use crate::node::{NodeKind, XmlNode};
use crate::parse::XmlDocument;
use quick_xml::escape::escape;

/// Serializes a node to markup. Elements become their full subtree
/// markup, including the namespace declarations needed to make the
/// fragment self-contained; other node kinds become their string value.
pub fn serialize_node(node: &XmlNode<'_, '_>) -> String {
    match node.kind() {
        NodeKind::Element => {
            let mut out = String::new();
            write_element(&mut out, node, None, 0, true);
            out
        }
        NodeKind::Root => {
            let mut out = String::new();
            for child in node.children() {
                write_child(&mut out, &child, None, 0);
            }
            out
        }
        _ => node.string_value(),
    }
}

/// Pretty-prints a parsed document with 2-space indentation.
/// Whitespace-only text nodes are dropped; element-only content is
/// broken across lines, text-only content stays inline.
pub fn format_document(doc: &XmlDocument<'_>) -> String {
    let mut out = String::new();
    for child in doc.root().children() {
        match child.kind() {
            NodeKind::Text if child.string_value().trim().is_empty() => {}
            _ => {
                write_child(&mut out, &child, Some(0), 0);
                out.push('\n');
            }
        }
    }
    if out.ends_with('\n') {
        out.pop();
    }
    out
}

// `indent` is None for compact output, Some(level) for pretty output.
fn write_child(out: &mut String, node: &XmlNode<'_, '_>, indent: Option<usize>, level: usize) {
    match node.kind() {
        NodeKind::Element => write_element(out, node, indent, level, false),
        NodeKind::Text => {
            let text = node.string_value();
            match indent {
                None => out.push_str(&escape(text.as_str())),
                Some(_) => {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        push_indent(out, level);
                        out.push_str(&escape(trimmed));
                    }
                }
            }
        }
        NodeKind::Comment => {
            if indent.is_some() {
                push_indent(out, level);
            }
            out.push_str("<!--");
            out.push_str(&node.string_value());
            out.push_str("-->");
        }
        NodeKind::ProcessingInstruction => {
            if indent.is_some() {
                push_indent(out, level);
            }
            out.push_str("<?");
            out.push_str(node.local_name().unwrap_or(""));
            let value = node.string_value();
            if !value.is_empty() {
                out.push(' ');
                out.push_str(&value);
            }
            out.push_str("?>");
        }
        NodeKind::Root | NodeKind::Attribute => {}
    }
}

fn write_element(
    out: &mut String,
    node: &XmlNode<'_, '_>,
    indent: Option<usize>,
    level: usize,
    fragment_root: bool,
) {
    let name = node.qualified_name().unwrap_or_default();

    if indent.is_some() {
        push_indent(out, level);
    }
    out.push('<');
    out.push_str(&name);

    for (prefix, uri) in declared_namespaces(node, fragment_root) {
        if prefix.is_empty() {
            out.push_str(&format!(" xmlns=\"{}\"", escape(uri)));
        } else {
            out.push_str(&format!(" xmlns:{}=\"{}\"", prefix, escape(uri)));
        }
    }
    for attr in node.attributes() {
        let attr_name = attr.qualified_name().unwrap_or_default();
        let value = attr.string_value();
        out.push_str(&format!(" {}=\"{}\"", attr_name, escape(value.as_str())));
    }

    let children: Vec<_> = node
        .children()
        .filter(|c| match (indent, c.kind()) {
            (Some(_), NodeKind::Text) => !c.string_value().trim().is_empty(),
            _ => true,
        })
        .collect();

    if children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');

    let inline = indent.is_none()
        || children
            .iter()
            .all(|c| c.kind() == NodeKind::Text);

    if inline {
        for child in &children {
            match child.kind() {
                NodeKind::Text if indent.is_some() => out.push_str(&escape(child.string_value().trim())),
                _ => write_child(out, child, None, 0),
            }
        }
    } else {
        for child in &children {
            out.push('\n');
            write_child(out, child, indent, level + 1);
        }
        out.push('\n');
        push_indent(out, level);
    }

    out.push_str("</");
    out.push_str(&name);
    out.push('>');
}

// Namespaces to declare on this element. A fragment root carries its
// whole in-scope set so the fragment re-parses on its own; nested
// elements only declare what their parent did not.
fn declared_namespaces<'a>(node: &XmlNode<'a, '_>, fragment_root: bool) -> Vec<(&'a str, &'a str)> {
    let Some(tree) = node.tree_node() else {
        return Vec::new();
    };
    let parent_scope: Vec<(&str, &str)> = if fragment_root {
        Vec::new()
    } else {
        tree.parent()
            .filter(|p| p.is_element())
            .map(|p| {
                p.namespaces()
                    .map(|ns| (ns.name().unwrap_or(""), ns.uri()))
                    .collect()
            })
            .unwrap_or_default()
    };

    tree.namespaces()
        .map(|ns| (ns.name().unwrap_or(""), ns.uri()))
        // The xml prefix is implicitly bound and must not be re-declared.
        .filter(|(prefix, _)| *prefix != "xml")
        .filter(|entry| !parent_scope.contains(entry))
        .collect()
}

fn push_indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_element_compact() {
        let xml = r#"<root><item id="1">a &amp; b</item></root>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        let item = doc.root_element().element_children().next().unwrap();
        assert_eq!(serialize_node(&item), r#"<item id="1">a &amp; b</item>"#);
    }

    #[test]
    fn test_serialize_carries_namespace_declarations() {
        let xml = r#"<root xmlns:bk="urn:books"><bk:book>X</bk:book></root>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        let book = doc.root_element().element_children().next().unwrap();
        assert_eq!(
            serialize_node(&book),
            r#"<bk:book xmlns:bk="urn:books">X</bk:book>"#
        );
    }

    #[test]
    fn test_format_breaks_elements_and_inlines_text() {
        let xml = "<catalog><book><title>Hi</title><price>5</price></book></catalog>";
        let doc = XmlDocument::parse(xml).unwrap();
        let pretty = format_document(&doc);
        assert_eq!(
            pretty,
            "<catalog>\n  <book>\n    <title>Hi</title>\n    <price>5</price>\n  </book>\n</catalog>"
        );
    }

    #[test]
    fn test_format_is_idempotent_structurally() {
        let xml = "<catalog><book id=\"1\"><title>Hi</title></book><empty/></catalog>";
        let doc = XmlDocument::parse(xml).unwrap();
        let once = format_document(&doc);
        let doc2 = XmlDocument::parse(&once).unwrap();
        let twice = format_document(&doc2);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_format_keeps_default_namespace() {
        let xml = r#"<catalog xmlns="urn:c"><book/></catalog>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        let pretty = format_document(&doc);
        assert_eq!(pretty, "<catalog xmlns=\"urn:c\">\n  <book/>\n</catalog>");
        assert!(XmlDocument::parse(&pretty).is_ok());
    }
}
