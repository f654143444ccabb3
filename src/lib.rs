//! An XML workbench engine: well-formedness checking, pretty-printing,
//! a practical XSD subset validator, an XPath 1.0 evaluator with
//! namespace handling, cursor-based XPath suggestions, and a small
//! XSLT interpreter.
//!
//! This crate is the integration layer; the engines live in the
//! `xmlbench-doc`, `xmlbench-xpath1`, `xmlbench-xsd` and
//! `xmlbench-xslt` member crates. Everything is synchronous, performs
//! no I/O, and reports failures as values.

pub mod error;
pub mod query;
pub mod session;
pub mod suggest;

pub use error::WorkbenchError;
pub use query::{QueryOutcome, parse_namespace_block, run_query};
pub use session::{NamespaceReport, Session, WellFormedReport};
pub use suggest::{XPathSuggestion, suggest_for_offset};

pub use xmlbench_doc::{
    NamespaceMap, ParseDiagnostic, ParserIssue, XmlDocument, XmlNode, extract_issues,
    extract_namespaces, format_document, infer_element_path, line_of_offset, serialize_node,
};
pub use xmlbench_xpath1::{XPathError, XPathValue, encode_literal, evaluate_in_document};
pub use xmlbench_xsd::{ValidationOutcome, XsdRules, build_rules, validate_text};
pub use xmlbench_xslt::{RenderStats, XsltError, XsltRenderResult, render};
