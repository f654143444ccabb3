//! Abstract syntax tree for the supported XPath 1.0 subset.

/// A parsed expression ready for evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(String),
    Number(f64),
    LocationPath(LocationPath),
    FunctionCall {
        name: String,
        args: Vec<Expression>,
    },
    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    Negate(Box<Expression>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Logical
    Or,
    And,
    // Equality
    Equals,
    NotEquals,
    // Relational
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    // Additive
    Plus,
    Minus,
    // Multiplicative
    Multiply,
    Divide,
    Modulo,
    // Set
    Union,
}

/// A location path like `/catalog/book[2]` or `//bk:title`.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPath {
    /// True if the path starts from the document root.
    pub is_absolute: bool,
    pub steps: Vec<Step>,
}

/// A single step: axis, node test, zero or more predicates.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub axis: Axis,
    pub node_test: NodeTest,
    pub predicates: Vec<Expression>,
}

impl Step {
    pub fn named(axis: Axis, prefix: Option<&str>, local: &str) -> Self {
        Step {
            axis,
            node_test: NodeTest::Name {
                prefix: prefix.map(str::to_string),
                local: local.to_string(),
            },
            predicates: Vec::new(),
        }
    }

    pub fn any_node(axis: Axis) -> Self {
        Step {
            axis,
            node_test: NodeTest::NodeType(NodeTypeTest::Node),
            predicates: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    Attribute,
    Parent,
    Ancestor,
    SelfAxis,
    FollowingSibling,
    PrecedingSibling,
}

impl Axis {
    /// Forward axes yield nodes in document order; reverse axes yield
    /// them nearest-first.
    pub fn is_forward(&self) -> bool {
        !matches!(self, Axis::Parent | Axis::Ancestor | Axis::PrecedingSibling)
    }
}

/// A test applied to nodes collected along an axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// A possibly-prefixed name test (`title`, `bk:title`). The prefix
    /// is resolved against the evaluation context's namespace map.
    Name {
        prefix: Option<String>,
        local: String,
    },
    /// `*`
    Wildcard,
    /// `text()`, `node()`, `comment()`
    NodeType(NodeTypeTest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeTypeTest {
    Text,
    Node,
    Comment,
}
