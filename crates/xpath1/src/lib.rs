pub mod ast;
pub mod axes;
pub mod engine;
pub mod error;
pub mod functions;
pub mod literal;
pub mod operators;
pub mod parser;

pub use ast::{Axis, BinaryOperator, Expression, LocationPath, NodeTest, Step};
pub use engine::{EvaluationContext, XPathValue, evaluate, evaluate_in_document};
pub use error::XPathError;
pub use literal::encode_literal;
pub use parser::parse_expression;
