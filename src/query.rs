//! The query operation: namespace-block parsing, evaluation, and
//! result stringification.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

use xmlbench_doc::{NamespaceMap, NodeKind, XmlDocument, XmlNode, extract_namespaces,
    serialize_node};
use xmlbench_xpath1::{XPathValue, evaluate_in_document};

use crate::error::WorkbenchError;

/// The classified result of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// A string/number/boolean result, already rendered as text.
    Scalar(String),
    /// A non-empty node-set, one rendered entry per node.
    Nodes(Vec<String>),
    /// A node-set that matched nothing. The hint flag is set when the
    /// document has a default namespace and the expression never uses a
    /// prefix, the most common cause of silent misses.
    Empty { default_namespace_hint: bool },
}

impl QueryOutcome {
    /// The text a result pane would display, nodes separated by blank
    /// lines.
    pub fn display_text(&self) -> String {
        match self {
            QueryOutcome::Scalar(text) => text.clone(),
            QueryOutcome::Nodes(entries) => entries.iter().join("\n\n"),
            QueryOutcome::Empty { .. } => String::new(),
        }
    }
}

/// Parses a `prefix=uri` namespace block, one declaration per line.
/// Blank lines and `#` comments are ignored; malformed lines are
/// skipped.
pub fn parse_namespace_block(block: &str) -> NamespaceMap {
    let mut map = NamespaceMap::new();
    for line in block.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((prefix, uri)) = line.split_once('=') else {
            continue;
        };
        let (prefix, uri) = (prefix.trim(), uri.trim());
        if prefix.is_empty() || uri.is_empty() {
            continue;
        }
        map.insert(prefix, uri);
    }
    map
}

/// Runs `expression` against `xml_text`. User namespace declarations
/// are merged over the auto-detected ones, user lines winning.
pub fn run_query(
    xml_text: &str,
    expression: &str,
    namespace_block: &str,
) -> Result<QueryOutcome, WorkbenchError> {
    let doc = XmlDocument::parse(xml_text)?;
    let mut namespaces = extract_namespaces(&doc);
    namespaces.merge(&parse_namespace_block(namespace_block));
    log::debug!("query '{expression}' with {} namespace bindings", namespaces.len());

    let value = evaluate_in_document(expression, &doc, &namespaces)?;
    Ok(classify(value, expression, &namespaces))
}

fn classify(
    value: XPathValue<'_, '_>,
    expression: &str,
    namespaces: &NamespaceMap,
) -> QueryOutcome {
    match value {
        XPathValue::NodeSet(nodes) if nodes.is_empty() => QueryOutcome::Empty {
            default_namespace_hint: namespaces.has_default()
                && !expression_uses_prefix(expression),
        },
        XPathValue::NodeSet(nodes) => {
            QueryOutcome::Nodes(nodes.iter().map(render_node).collect())
        }
        scalar => QueryOutcome::Scalar(scalar.to_string()),
    }
}

static PREFIXED_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z_][\w.\-]*:").unwrap());

fn expression_uses_prefix(expression: &str) -> bool {
    PREFIXED_NAME.is_match(expression)
}

// One displayable entry per matched node.
fn render_node(node: &XmlNode<'_, '_>) -> String {
    match node.kind() {
        NodeKind::Attribute => {
            let name = node.qualified_name().unwrap_or_default();
            format!("@{}=\"{}\"", name, node.string_value())
        }
        NodeKind::Text => node.string_value().trim().to_string(),
        NodeKind::Element | NodeKind::Root => serialize_node(node),
        _ => {
            let text = node.string_value();
            if text.is_empty() {
                node.local_name().unwrap_or("").to_string()
            } else {
                text
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"<catalog><book id="a"><title>First</title></book><book id="b"><title>Second</title></book></catalog>"#;

    #[test]
    fn test_namespace_block_parsing() {
        let block = "bk=urn:books\n\n# comment\nbad-line\nx = urn:x \n=urn:noprefix";
        let map = parse_namespace_block(block);
        assert_eq!(map.get("bk"), Some("urn:books"));
        assert_eq!(map.get("x"), Some("urn:x"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_element_results_serialize_markup() {
        let outcome = run_query(CATALOG, "/catalog/book[1]/title", "").unwrap();
        assert_eq!(
            outcome,
            QueryOutcome::Nodes(vec!["<title>First</title>".to_string()])
        );
    }

    #[test]
    fn test_attribute_and_text_rendering() {
        let outcome = run_query(CATALOG, "//book/@id", "").unwrap();
        assert_eq!(
            outcome,
            QueryOutcome::Nodes(vec!["@id=\"a\"".to_string(), "@id=\"b\"".to_string()])
        );

        let outcome = run_query(CATALOG, "//title/text()", "").unwrap();
        assert_eq!(
            outcome,
            QueryOutcome::Nodes(vec!["First".to_string(), "Second".to_string()])
        );
    }

    #[test]
    fn test_scalar_results() {
        let outcome = run_query(CATALOG, "count(//book)", "").unwrap();
        assert_eq!(outcome, QueryOutcome::Scalar("2".to_string()));

        let outcome = run_query(CATALOG, "string(//title)", "").unwrap();
        assert_eq!(outcome, QueryOutcome::Scalar("First".to_string()));
    }

    #[test]
    fn test_user_namespace_lines_win_over_detected() {
        let xml = r#"<c xmlns:bk="urn:old"><bk:t>X</bk:t></c>"#;
        // Rebinding bk to the actual URI of the document's elements.
        let outcome = run_query(xml, "//bk:t", "bk=urn:old").unwrap();
        assert_eq!(outcome, QueryOutcome::Nodes(vec![
            "<bk:t xmlns:bk=\"urn:old\">X</bk:t>".to_string()
        ]));

        let miss = run_query(xml, "//bk:t", "bk=urn:other").unwrap();
        assert!(matches!(miss, QueryOutcome::Empty { .. }));
    }

    #[test]
    fn test_default_namespace_hint() {
        let xml = r#"<catalog xmlns="urn:c"><book/></catalog>"#;
        let outcome = run_query(xml, "/catalog/book", "").unwrap();
        assert_eq!(
            outcome,
            QueryOutcome::Empty {
                default_namespace_hint: true
            }
        );

        // A prefixed expression means the user already thought about
        // namespaces; no hint.
        let outcome = run_query(xml, "/c:catalog/c:missing", "c=urn:c").unwrap();
        assert_eq!(
            outcome,
            QueryOutcome::Empty {
                default_namespace_hint: false
            }
        );
    }

    #[test]
    fn test_display_text_joins_with_blank_lines() {
        let outcome = run_query(CATALOG, "//title", "").unwrap();
        assert_eq!(
            outcome.display_text(),
            "<title>First</title>\n\n<title>Second</title>"
        );
    }

    #[test]
    fn test_malformed_xml_is_a_parse_error() {
        let err = run_query("<a><b></a>", "/a", "").unwrap_err();
        assert!(matches!(err, WorkbenchError::Parse(_)));
    }
}
