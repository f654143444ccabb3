//! Walks the stylesheet tree and emits text.
//!
//! Instructions are elements in the XSLT 1.0 namespace; everything else
//! is a literal result element whose children are rendered in place
//! (output is text, so literal markup itself is dropped).

use serde::Serialize;
use xmlbench_doc::{NamespaceMap, NodeKind, XmlDocument, XmlNode};
use xmlbench_xpath1::engine::{EvaluationContext, XPathValue, evaluate};
use xmlbench_xpath1::parser::parse_expression;

use crate::error::XsltError;

pub const XSL_NAMESPACE: &str = "http://www.w3.org/1999/XSL/Transform";

/// Execution counters. A transform with `for_each_total > 0` but
/// `for_each_matched_nodes == 0` produced output without ever iterating,
/// which usually means a select expression matched nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RenderStats {
    pub for_each_total: u32,
    pub for_each_matched_nodes: u32,
    pub value_of_total: u32,
    pub value_of_non_empty: u32,
}

#[derive(Debug, Clone)]
pub struct XsltRenderResult {
    pub output: String,
    pub stats: RenderStats,
}

/// Applies the stylesheet's first `match="/"` template to the document
/// and returns the text output plus execution counters.
pub fn render(
    xml_doc: &XmlDocument<'_>,
    xslt_doc: &XmlDocument<'_>,
    namespaces: &NamespaceMap,
) -> Result<XsltRenderResult, XsltError> {
    let template = find_root_template(xslt_doc).ok_or(XsltError::UnsupportedStylesheet)?;

    let mut output = String::new();
    let mut stats = RenderStats::default();
    let ctx = EvaluationContext::new(xml_doc.root(), namespaces);

    render_children(&template, &ctx, &mut output, &mut stats)?;

    log::debug!(
        "transform finished: {} for-each, {} nodes matched, {} value-of",
        stats.for_each_total,
        stats.for_each_matched_nodes,
        stats.value_of_total
    );
    Ok(XsltRenderResult { output, stats })
}

// The first template element (document order) with match="/". There is
// no general template dispatch.
fn find_root_template<'a, 'input: 'a>(
    xslt_doc: &'a XmlDocument<'input>,
) -> Option<XmlNode<'a, 'input>> {
    descendants(&xslt_doc.root()).find(|node| {
        is_instruction(node, "template") && node.attribute_value("match") == Some("/")
    })
}

fn descendants<'a, 'input: 'a>(
    node: &XmlNode<'a, 'input>,
) -> Box<dyn Iterator<Item = XmlNode<'a, 'input>> + 'a> {
    match node.tree_node() {
        Some(tree) => Box::new(tree.descendants().map(XmlNode::Tree)),
        None => Box::new(std::iter::empty()),
    }
}

fn is_instruction(node: &XmlNode<'_, '_>, local: &str) -> bool {
    node.is_element()
        && node.namespace_uri() == Some(XSL_NAMESPACE)
        && node.local_name() == Some(local)
}

fn render_children<'a, 'input: 'a>(
    parent: &XmlNode<'a, 'input>,
    ctx: &EvaluationContext<'a, 'input, '_>,
    output: &mut String,
    stats: &mut RenderStats,
) -> Result<(), XsltError> {
    for child in parent.children() {
        render_node(&child, ctx, output, stats)?;
    }
    Ok(())
}

fn render_node<'a, 'input: 'a>(
    node: &XmlNode<'a, 'input>,
    ctx: &EvaluationContext<'a, 'input, '_>,
    output: &mut String,
    stats: &mut RenderStats,
) -> Result<(), XsltError> {
    match node.kind() {
        NodeKind::Text => {
            output.push_str(&decode_escapes(&node.string_value()));
            Ok(())
        }
        NodeKind::Element => {
            if node.namespace_uri() == Some(XSL_NAMESPACE) {
                render_instruction(node, ctx, output, stats)
            } else {
                // Literal result element: text output keeps only content.
                render_children(node, ctx, output, stats)
            }
        }
        _ => Ok(()),
    }
}

fn render_instruction<'a, 'input: 'a>(
    node: &XmlNode<'a, 'input>,
    ctx: &EvaluationContext<'a, 'input, '_>,
    output: &mut String,
    stats: &mut RenderStats,
) -> Result<(), XsltError> {
    match node.local_name().unwrap_or("") {
        "for-each" => {
            let select = required_attribute(node, "for-each", "select")?;
            stats.for_each_total += 1;
            let value = select_value(select, ctx)?;
            let XPathValue::NodeSet(mut nodes) = value else {
                log::warn!("for-each select '{select}' did not yield a node-set; skipped");
                return Ok(());
            };
            nodes.sort();
            let size = nodes.len();
            for (index, matched) in nodes.into_iter().enumerate() {
                stats.for_each_matched_nodes += 1;
                let item_ctx = ctx.at(matched, index + 1, size);
                render_children(node, &item_ctx, output, stats)?;
            }
            Ok(())
        }
        "value-of" => {
            let select = required_attribute(node, "value-of", "select")?;
            stats.value_of_total += 1;
            let text = select_value(select, ctx)?.to_string();
            if !text.is_empty() {
                stats.value_of_non_empty += 1;
            }
            output.push_str(&text);
            Ok(())
        }
        "text" => {
            output.push_str(&decode_escapes(&node.string_value()));
            Ok(())
        }
        "if" => {
            let test = required_attribute(node, "if", "test")?;
            let text = select_value(test, ctx)?.to_string();
            if is_truthy(&text) {
                render_children(node, ctx, output, stats)?;
            }
            Ok(())
        }
        other => {
            // stylesheet wrappers, xsl:output and anything unsupported.
            log::warn!("skipping unsupported instruction <xsl:{other}>");
            Ok(())
        }
    }
}

fn required_attribute<'a>(
    node: &XmlNode<'a, '_>,
    instruction: &str,
    attribute: &str,
) -> Result<&'a str, XsltError> {
    node.attribute_value(attribute)
        .ok_or_else(|| XsltError::MissingAttribute {
            instruction: instruction.to_string(),
            attribute: attribute.to_string(),
        })
}

fn select_value<'a, 'input: 'a>(
    expression: &str,
    ctx: &EvaluationContext<'a, 'input, '_>,
) -> Result<XPathValue<'a, 'input>, XsltError> {
    let parsed = parse_expression(expression)?;
    Ok(evaluate(&parsed, ctx)?)
}

// Stylesheet text often carries literal `\n` / `\t` sequences because
// the source was authored in a single-line editor field. Each sequence
// decodes to its actual control characters.
fn decode_escapes(text: &str) -> String {
    text.replace("\\r\\n", "\r\n")
        .replace("\\n", "\n")
        .replace("\\t", "\t")
}

// The truthiness the original transform UI used: the string result of
// the test, with "false" and "0" spelled out as false.
fn is_truthy(text: &str) -> bool {
    !(text.is_empty() || text == "false" || text == "0")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(xml: &str, xslt: &str) -> Result<XsltRenderResult, XsltError> {
        let xml_doc = XmlDocument::parse(xml).unwrap();
        let xslt_doc = XmlDocument::parse(xslt).unwrap();
        let ns = NamespaceMap::new();
        render(&xml_doc, &xslt_doc, &ns)
    }

    const CATALOG: &str = "<catalog>\
        <book><title>First</title><price>10</price></book>\
        <book><title>Second</title><price>20</price></book>\
    </catalog>";

    #[test]
    fn test_for_each_value_of() {
        let xslt = r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
          <xsl:template match="/">
            <xsl:for-each select="/catalog/book">
              <xsl:value-of select="title"/><xsl:text>\n</xsl:text>
            </xsl:for-each>
          </xsl:template>
        </xsl:stylesheet>"#;
        let result = run(CATALOG, xslt).unwrap();
        assert!(result.output.contains("First\n"));
        assert!(result.output.contains("Second\n"));
        assert_eq!(result.stats.for_each_total, 1);
        assert_eq!(result.stats.for_each_matched_nodes, 2);
        assert_eq!(result.stats.value_of_total, 2);
        assert_eq!(result.stats.value_of_non_empty, 2);
    }

    #[test]
    fn test_missing_root_template_is_an_error() {
        let xslt = r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
          <xsl:template match="book"/>
        </xsl:stylesheet>"#;
        let err = run(CATALOG, xslt).unwrap_err();
        assert!(matches!(err, XsltError::UnsupportedStylesheet));
    }

    #[test]
    fn test_if_filters_by_string_truthiness() {
        let xslt = r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
          <xsl:template match="/">
            <xsl:for-each select="/catalog/book">
              <xsl:if test="price &gt; 15"><xsl:value-of select="title"/></xsl:if>
            </xsl:for-each>
          </xsl:template>
        </xsl:stylesheet>"#;
        let result = run(CATALOG, xslt).unwrap();
        assert_eq!(result.output.trim(), "Second");
    }

    #[test]
    fn test_literal_elements_keep_only_content() {
        let xslt = r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
          <xsl:template match="/"><h1>Report</h1></xsl:template>
        </xsl:stylesheet>"#;
        let result = run(CATALOG, xslt).unwrap();
        assert_eq!(result.output.trim(), "Report");
    }

    #[test]
    fn test_missing_select_attribute() {
        let xslt = r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
          <xsl:template match="/"><xsl:value-of/></xsl:template>
        </xsl:stylesheet>"#;
        let err = run(CATALOG, xslt).unwrap_err();
        assert!(matches!(
            err,
            XsltError::MissingAttribute { ref instruction, ref attribute }
                if instruction == "value-of" && attribute == "select"
        ));
    }

    #[test]
    fn test_unsupported_instructions_are_skipped() {
        let xslt = r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
          <xsl:output method="text"/>
          <xsl:template match="/">
            <xsl:apply-templates/>
            <xsl:text>done</xsl:text>
          </xsl:template>
        </xsl:stylesheet>"#;
        let result = run(CATALOG, xslt).unwrap();
        assert_eq!(result.output.trim(), "done");
    }

    #[test]
    fn test_empty_match_leaves_counter_trail() {
        let xslt = r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
          <xsl:template match="/">
            <xsl:for-each select="/catalog/missing"><xsl:value-of select="."/></xsl:for-each>
          </xsl:template>
        </xsl:stylesheet>"#;
        let result = run(CATALOG, xslt).unwrap();
        assert_eq!(result.stats.for_each_total, 1);
        assert_eq!(result.stats.for_each_matched_nodes, 0);
        assert!(result.output.trim().is_empty());
    }

    #[test]
    fn test_escape_sequences_in_text() {
        assert_eq!(decode_escapes("a\\nb\\tc"), "a\nb\tc");
        assert_eq!(decode_escapes("a\\r\\nb"), "a\r\nb");
    }

    #[test]
    fn test_stats_serialize_shape() {
        let stats = RenderStats {
            for_each_total: 1,
            for_each_matched_nodes: 2,
            value_of_total: 3,
            value_of_non_empty: 3,
        };
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["for_each_matched_nodes"], 2);
    }
}
