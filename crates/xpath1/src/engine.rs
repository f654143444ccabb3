//! Evaluates parsed expressions against a document.

use std::collections::HashSet;
use std::fmt;

use xmlbench_doc::{NamespaceMap, NodeKind, XmlDocument, XmlNode};

use crate::ast::{Axis, Expression, LocationPath, NodeTest, NodeTypeTest, Step};
use crate::error::XPathError;
use crate::{axes, functions, operators, parser};

/// The result of evaluating an expression: one of the four XPath 1.0
/// value types.
#[derive(Debug, Clone, PartialEq)]
pub enum XPathValue<'a, 'input> {
    NodeSet(Vec<XmlNode<'a, 'input>>),
    String(String),
    Number(f64),
    Boolean(bool),
}

impl<'a, 'input: 'a> XPathValue<'a, 'input> {
    pub fn to_boolean(&self) -> bool {
        match self {
            XPathValue::NodeSet(nodes) => !nodes.is_empty(),
            XPathValue::String(s) => !s.is_empty(),
            XPathValue::Number(n) => *n != 0.0 && !n.is_nan(),
            XPathValue::Boolean(b) => *b,
        }
    }

    pub fn to_number(&self) -> f64 {
        match self {
            XPathValue::NodeSet(_) | XPathValue::String(_) => {
                let s = self.to_string();
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    f64::NAN
                } else {
                    trimmed.parse().unwrap_or(f64::NAN)
                }
            }
            XPathValue::Number(n) => *n,
            XPathValue::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    pub fn is_node_set(&self) -> bool {
        matches!(self, XPathValue::NodeSet(_))
    }
}

/// The XPath 1.0 string conversion. A node-set converts to the string
/// value of its first node.
impl fmt::Display for XPathValue<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XPathValue::NodeSet(nodes) => match nodes.first() {
                Some(node) => write!(f, "{}", node.string_value()),
                None => Ok(()),
            },
            XPathValue::String(s) => write!(f, "{}", s),
            XPathValue::Number(n) => write!(f, "{}", format_number(*n)),
            XPathValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// Formats a number the way `string(number)` does: no trailing `.0` on
/// integral values, `NaN` and signed `Infinity` spelled out.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        // Merges -0 into 0.
        "0".to_string()
    } else {
        format!("{}", n)
    }
}

/// Everything an expression needs to evaluate: the context node, the
/// document root for absolute paths, the proximity position, and the
/// prefix→URI map used to resolve prefixed name tests.
#[derive(Debug, Clone)]
pub struct EvaluationContext<'a, 'input, 'd> {
    pub context_node: XmlNode<'a, 'input>,
    pub root_node: XmlNode<'a, 'input>,
    pub context_position: usize,
    pub context_size: usize,
    pub namespaces: &'d NamespaceMap,
}

impl<'a, 'input: 'a, 'd> EvaluationContext<'a, 'input, 'd> {
    pub fn new(root_node: XmlNode<'a, 'input>, namespaces: &'d NamespaceMap) -> Self {
        Self {
            context_node: root_node,
            root_node,
            context_position: 1,
            context_size: 1,
            namespaces,
        }
    }

    /// A derived context focused on one node of a candidate list.
    pub fn at(&self, node: XmlNode<'a, 'input>, position: usize, size: usize) -> Self {
        Self {
            context_node: node,
            root_node: self.root_node,
            context_position: position,
            context_size: size,
            namespaces: self.namespaces,
        }
    }
}

/// Parses and evaluates an expression with the document root as the
/// context node.
pub fn evaluate_in_document<'a, 'input: 'a>(
    expression: &str,
    doc: &'a XmlDocument<'input>,
    namespaces: &NamespaceMap,
) -> Result<XPathValue<'a, 'input>, XPathError> {
    let parsed = parser::parse_expression(expression)?;
    let ctx = EvaluationContext::new(doc.root(), namespaces);
    evaluate(&parsed, &ctx)
}

pub fn evaluate<'a, 'input: 'a>(
    expr: &Expression,
    ctx: &EvaluationContext<'a, 'input, '_>,
) -> Result<XPathValue<'a, 'input>, XPathError> {
    match expr {
        Expression::Literal(s) => Ok(XPathValue::String(s.clone())),
        Expression::Number(n) => Ok(XPathValue::Number(*n)),
        Expression::Negate(inner) => {
            let value = evaluate(inner, ctx)?;
            Ok(XPathValue::Number(-value.to_number()))
        }
        Expression::BinaryOp { left, op, right } => {
            let lhs = evaluate(left, ctx)?;
            let rhs = evaluate(right, ctx)?;
            operators::apply(*op, lhs, rhs)
        }
        Expression::FunctionCall { name, args } => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(evaluate(arg, ctx)?);
            }
            functions::evaluate_function(name, values, ctx)
        }
        Expression::LocationPath(path) => evaluate_path(path, ctx),
    }
}

fn evaluate_path<'a, 'input: 'a>(
    path: &LocationPath,
    ctx: &EvaluationContext<'a, 'input, '_>,
) -> Result<XPathValue<'a, 'input>, XPathError> {
    let mut current = if path.is_absolute {
        vec![ctx.root_node]
    } else {
        vec![ctx.context_node]
    };

    for step in &path.steps {
        current = evaluate_step(step, &current, ctx)?;
        if current.is_empty() {
            break;
        }
    }

    Ok(XPathValue::NodeSet(current))
}

fn evaluate_step<'a, 'input: 'a>(
    step: &Step,
    context_nodes: &[XmlNode<'a, 'input>],
    ctx: &EvaluationContext<'a, 'input, '_>,
) -> Result<Vec<XmlNode<'a, 'input>>, XPathError> {
    let mut seen = HashSet::new();
    let mut collected = Vec::new();
    for node in context_nodes {
        axes::collect(step.axis, *node, &mut seen, &mut collected);
    }

    let mut matched = Vec::new();
    for node in collected {
        if node_test_matches(&step.node_test, step.axis, &node, ctx.namespaces)? {
            matched.push(node);
        }
    }
    if step.axis.is_forward() {
        matched.sort();
    }

    for predicate in &step.predicates {
        let size = matched.len();
        let mut kept = Vec::with_capacity(size);
        for (index, node) in matched.iter().enumerate() {
            let position = index + 1;
            let pred_ctx = ctx.at(*node, position, size);
            let value = evaluate(predicate, &pred_ctx)?;
            // A bare number predicate is a position test.
            let keep = match value {
                XPathValue::Number(n) => position as f64 == n,
                other => other.to_boolean(),
            };
            if keep {
                kept.push(*node);
            }
        }
        matched = kept;
    }

    Ok(matched)
}

/// Name tests resolve prefixes through the context's namespace map; an
/// unbound prefix is an error, and an unprefixed test only matches
/// nodes in no namespace.
fn node_test_matches(
    test: &NodeTest,
    axis: Axis,
    node: &XmlNode<'_, '_>,
    namespaces: &NamespaceMap,
) -> Result<bool, XPathError> {
    let principal = if axis == Axis::Attribute {
        NodeKind::Attribute
    } else {
        NodeKind::Element
    };

    match test {
        NodeTest::Wildcard => Ok(node.kind() == principal),
        NodeTest::NodeType(NodeTypeTest::Node) => Ok(true),
        NodeTest::NodeType(NodeTypeTest::Text) => Ok(node.kind() == NodeKind::Text),
        NodeTest::NodeType(NodeTypeTest::Comment) => Ok(node.kind() == NodeKind::Comment),
        NodeTest::Name { prefix, local } => {
            if node.kind() != principal || node.local_name() != Some(local.as_str()) {
                return Ok(false);
            }
            match prefix {
                Some(p) => {
                    let uri = namespaces
                        .get(p)
                        .ok_or_else(|| XPathError::UnknownPrefix(p.clone()))?;
                    Ok(node.namespace_uri() == Some(uri))
                }
                None => Ok(node.namespace_uri().is_none()),
            }
        }
    }
}
