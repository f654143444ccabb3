//! Generates candidate XPath expressions for the element under the
//! cursor, ordered from most specific to most speculative.

use itertools::Itertools;
use serde::Serialize;

use xmlbench_doc::{XmlDocument, XmlNode, extract_namespaces, infer_element_path};
use xmlbench_xpath1::{XPathValue, encode_literal, evaluate_in_document};

use crate::error::WorkbenchError;

const MAX_SUGGESTIONS: usize = 5;
const MAX_TEXT_PROBE: usize = 80;

/// One candidate expression with its strategy label and a
/// human-readable confidence tag.
#[derive(Debug, Clone, Serialize)]
pub struct XPathSuggestion {
    pub label: String,
    pub score: String,
    pub xpath: String,
}

impl XPathSuggestion {
    fn new(label: &str, score: &str, xpath: String) -> Self {
        XPathSuggestion {
            label: label.to_string(),
            score: score.to_string(),
            xpath,
        }
    }
}

/// Suggests expressions for the element open at `offset` in `xml_text`.
/// Requires well-formed XML; returns an empty list when the cursor
/// cannot be mapped back to a node.
pub fn suggest_for_offset(
    xml_text: &str,
    offset: usize,
) -> Result<Vec<XPathSuggestion>, WorkbenchError> {
    let doc = XmlDocument::parse(xml_text)?;
    let stack = infer_element_path(xml_text, offset);
    log::debug!("suggesting for cursor stack {stack:?}");

    let Some(node) = representative_node(&doc, &stack) else {
        return Ok(Vec::new());
    };
    Ok(build_suggestions(&node))
}

// Maps the textual tag stack back onto a parsed node: the joined
// absolute path first, then the last open tag anywhere, both resolved
// against the document's own namespace declarations. A stack the
// evaluator cannot express (default-namespace names, unknown prefixes)
// yields nothing.
fn representative_node<'a, 'input: 'a>(
    doc: &'a XmlDocument<'input>,
    stack: &[String],
) -> Option<XmlNode<'a, 'input>> {
    if stack.is_empty() {
        return Some(doc.root_element());
    }
    let namespaces = extract_namespaces(doc);
    let absolute = format!("/{}", stack.iter().join("/"));
    for probe in [absolute, format!("//{}", stack[stack.len() - 1])] {
        if let Ok(XPathValue::NodeSet(nodes)) = evaluate_in_document(&probe, doc, &namespaces)
            && let Some(node) = nodes.into_iter().next()
        {
            return Some(node);
        }
    }
    None
}

fn build_suggestions(node: &XmlNode<'_, '_>) -> Vec<XPathSuggestion> {
    let name = match node.qualified_name() {
        Some(name) => name,
        None => return Vec::new(),
    };

    let mut suggestions = vec![
        XPathSuggestion::new("Absolute", "Fragile", absolute_path(node)),
        XPathSuggestion::new("By tag", "Broad", format!("//{name}")),
    ];

    if node.namespace_uri().is_some() {
        suggestions.push(XPathSuggestion::new(
            "By local-name",
            "Namespace-safe",
            local_name_path(node),
        ));
    }

    if let Some(attr) = node.attributes().next() {
        let attr_name = attr.qualified_name().unwrap_or_default();
        let encoded = encode_literal(&attr.string_value());
        suggestions.push(XPathSuggestion::new(
            "By attribute",
            "Stable",
            format!("//{name}[@{attr_name}={encoded}]"),
        ));
    }

    if !node.has_element_children() {
        let text = node.string_value().split_whitespace().join(" ");
        if !text.is_empty() && text.chars().count() <= MAX_TEXT_PROBE {
            suggestions.push(XPathSuggestion::new(
                "By text",
                "Medium",
                format!("//{name}[normalize-space(.)={}]", encode_literal(&text)),
            ));
        }
    }

    suggestions
        .into_iter()
        .unique_by(|s| s.xpath.clone())
        .take(MAX_SUGGESTIONS)
        .collect()
}

// Ancestor chain from the root element down, every step indexed by its
// 1-based position among same-named element siblings.
fn absolute_path(node: &XmlNode<'_, '_>) -> String {
    let mut segments = Vec::new();
    let mut current = Some(*node);
    while let Some(el) = current.filter(|n| n.is_element()) {
        let name = el.qualified_name().unwrap_or_default();
        let index = sibling_index(&el, |sibling| {
            sibling.qualified_name().as_deref() == Some(name.as_str())
        });
        segments.push(format!("{name}[{index}]"));
        current = el.parent();
    }
    segments.reverse();
    format!("/{}", segments.iter().join("/"))
}

// The same chain expressed through local-name() tests only, immune to
// prefix renames and default namespaces.
fn local_name_path(node: &XmlNode<'_, '_>) -> String {
    let mut segments = Vec::new();
    let mut current = Some(*node);
    while let Some(el) = current.filter(|n| n.is_element()) {
        let local = el.local_name().unwrap_or_default();
        let index = sibling_index(&el, |sibling| sibling.local_name() == Some(local));
        segments.push(format!("*[local-name()='{local}'][{index}]"));
        current = el.parent();
    }
    segments.reverse();
    format!("/{}", segments.iter().join("/"))
}

fn sibling_index(el: &XmlNode<'_, '_>, same_name: impl Fn(&XmlNode<'_, '_>) -> bool) -> usize {
    match el.parent() {
        Some(parent) => {
            parent
                .element_children()
                .filter(|s| same_name(s))
                .position(|s| s == *el)
                .unwrap_or(0)
                + 1
        }
        None => 1,
    }
}
