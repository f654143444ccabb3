//! Binary operator semantics, including the existential comparison
//! rules that apply when an operand is a node-set.

use crate::ast::BinaryOperator;
use crate::engine::XPathValue;
use crate::error::XPathError;

pub fn apply<'a, 'input: 'a>(
    op: BinaryOperator,
    lhs: XPathValue<'a, 'input>,
    rhs: XPathValue<'a, 'input>,
) -> Result<XPathValue<'a, 'input>, XPathError> {
    match op {
        BinaryOperator::Or => Ok(XPathValue::Boolean(lhs.to_boolean() || rhs.to_boolean())),
        BinaryOperator::And => Ok(XPathValue::Boolean(lhs.to_boolean() && rhs.to_boolean())),

        BinaryOperator::Equals => Ok(XPathValue::Boolean(equality(&lhs, &rhs, false))),
        BinaryOperator::NotEquals => Ok(XPathValue::Boolean(equality(&lhs, &rhs, true))),

        BinaryOperator::LessThan => relational(&lhs, &rhs, |a, b| a < b),
        BinaryOperator::LessThanOrEqual => relational(&lhs, &rhs, |a, b| a <= b),
        BinaryOperator::GreaterThan => relational(&lhs, &rhs, |a, b| a > b),
        BinaryOperator::GreaterThanOrEqual => relational(&lhs, &rhs, |a, b| a >= b),

        BinaryOperator::Plus => Ok(XPathValue::Number(lhs.to_number() + rhs.to_number())),
        BinaryOperator::Minus => Ok(XPathValue::Number(lhs.to_number() - rhs.to_number())),
        BinaryOperator::Multiply => Ok(XPathValue::Number(lhs.to_number() * rhs.to_number())),
        BinaryOperator::Divide => Ok(XPathValue::Number(lhs.to_number() / rhs.to_number())),
        BinaryOperator::Modulo => Ok(XPathValue::Number(lhs.to_number() % rhs.to_number())),

        BinaryOperator::Union => union(lhs, rhs),
    }
}

// Node-set operands compare existentially: the comparison is true if
// any member satisfies it.
fn string_values(value: &XPathValue<'_, '_>) -> Vec<String> {
    match value {
        XPathValue::NodeSet(nodes) => nodes.iter().map(|n| n.string_value()).collect(),
        other => vec![other.to_string()],
    }
}

fn equality(lhs: &XPathValue<'_, '_>, rhs: &XPathValue<'_, '_>, negate: bool) -> bool {
    let check = |matched: bool| if negate { !matched } else { matched };

    match (lhs, rhs) {
        (XPathValue::NodeSet(_), XPathValue::NodeSet(_)) => {
            let left = string_values(lhs);
            let right = string_values(rhs);
            left.iter().any(|a| right.iter().any(|b| check(a == b)))
        }
        (XPathValue::NodeSet(_), XPathValue::Number(n))
        | (XPathValue::Number(n), XPathValue::NodeSet(_)) => {
            let nodes = if lhs.is_node_set() { lhs } else { rhs };
            string_values(nodes)
                .iter()
                .any(|s| check(s.trim().parse::<f64>().unwrap_or(f64::NAN) == *n))
        }
        (XPathValue::NodeSet(_), XPathValue::String(s))
        | (XPathValue::String(s), XPathValue::NodeSet(_)) => {
            let nodes = if lhs.is_node_set() { lhs } else { rhs };
            string_values(nodes).iter().any(|v| check(v == s))
        }
        (XPathValue::NodeSet(_), XPathValue::Boolean(b))
        | (XPathValue::Boolean(b), XPathValue::NodeSet(_)) => {
            let nodes = if lhs.is_node_set() { lhs } else { rhs };
            check(nodes.to_boolean() == *b)
        }
        (XPathValue::Boolean(_), _) | (_, XPathValue::Boolean(_)) => {
            check(lhs.to_boolean() == rhs.to_boolean())
        }
        (XPathValue::Number(_), _) | (_, XPathValue::Number(_)) => {
            check(lhs.to_number() == rhs.to_number())
        }
        _ => check(lhs.to_string() == rhs.to_string()),
    }
}

fn relational<'a, 'input: 'a>(
    lhs: &XPathValue<'a, 'input>,
    rhs: &XPathValue<'a, 'input>,
    cmp: fn(f64, f64) -> bool,
) -> Result<XPathValue<'a, 'input>, XPathError> {
    let left: Vec<f64> = string_values(lhs)
        .iter()
        .map(|s| s.trim().parse().unwrap_or(f64::NAN))
        .collect();
    let right: Vec<f64> = string_values(rhs)
        .iter()
        .map(|s| s.trim().parse().unwrap_or(f64::NAN))
        .collect();
    let matched = left.iter().any(|a| right.iter().any(|b| cmp(*a, *b)));
    Ok(XPathValue::Boolean(matched))
}

fn union<'a, 'input: 'a>(
    lhs: XPathValue<'a, 'input>,
    rhs: XPathValue<'a, 'input>,
) -> Result<XPathValue<'a, 'input>, XPathError> {
    match (lhs, rhs) {
        (XPathValue::NodeSet(mut left), XPathValue::NodeSet(right)) => {
            left.extend(right);
            left.sort();
            left.dedup();
            Ok(XPathValue::NodeSet(left))
        }
        _ => Err(XPathError::Type(
            "The union operator '|' requires node-set operands".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::evaluate_in_document;
    use xmlbench_doc::{NamespaceMap, XmlDocument};

    #[test]
    fn test_logic_and_arithmetic() {
        let and = apply(
            BinaryOperator::And,
            XPathValue::Boolean(true),
            XPathValue::Number(0.0),
        )
        .unwrap();
        assert_eq!(and, XPathValue::Boolean(false));

        let sum = apply(
            BinaryOperator::Plus,
            XPathValue::String("2".into()),
            XPathValue::Number(3.0),
        )
        .unwrap();
        assert_eq!(sum, XPathValue::Number(5.0));

        let rem = apply(
            BinaryOperator::Modulo,
            XPathValue::Number(7.0),
            XPathValue::Number(2.0),
        )
        .unwrap();
        assert_eq!(rem, XPathValue::Number(1.0));
    }

    #[test]
    fn test_string_and_number_equality() {
        let eq = apply(
            BinaryOperator::Equals,
            XPathValue::String("5".into()),
            XPathValue::Number(5.0),
        )
        .unwrap();
        assert_eq!(eq, XPathValue::Boolean(true));

        let ne = apply(
            BinaryOperator::NotEquals,
            XPathValue::String("a".into()),
            XPathValue::String("b".into()),
        )
        .unwrap();
        assert_eq!(ne, XPathValue::Boolean(true));
    }

    #[test]
    fn test_node_set_equality_is_existential() {
        let doc = XmlDocument::parse("<r><p>10</p><p>20</p></r>").unwrap();
        let ns = NamespaceMap::new();
        assert_eq!(
            evaluate_in_document("//p = 20", &doc, &ns).unwrap(),
            XPathValue::Boolean(true)
        );
        // Both comparisons hold on the same set: some member is 20 and
        // some member is not.
        assert_eq!(
            evaluate_in_document("//p != 20", &doc, &ns).unwrap(),
            XPathValue::Boolean(true)
        );
        assert_eq!(
            evaluate_in_document("//p = 30", &doc, &ns).unwrap(),
            XPathValue::Boolean(false)
        );
    }

    #[test]
    fn test_node_set_relational() {
        let doc = XmlDocument::parse("<r><p>10</p><p>20</p></r>").unwrap();
        let ns = NamespaceMap::new();
        assert_eq!(
            evaluate_in_document("//p > 15", &doc, &ns).unwrap(),
            XPathValue::Boolean(true)
        );
        assert_eq!(
            evaluate_in_document("//p &lt; 5", &doc, &ns).unwrap(),
            XPathValue::Boolean(false)
        );
    }

    #[test]
    fn test_union_requires_node_sets() {
        let err = apply(
            BinaryOperator::Union,
            XPathValue::Number(1.0),
            XPathValue::Number(2.0),
        )
        .unwrap_err();
        assert!(matches!(err, XPathError::Type(_)));
    }
}
