//! Wraps the XML parser and turns its failures into structured diagnostics.

use crate::node::XmlNode;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// A single `(line, column)` record extracted from a parser diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParserIssue {
    pub line: u32,
    pub column: u32,
    pub message: String,
}

/// A parse failure: the human-readable diagnostic plus any positional
/// issues that could be extracted from it.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ParseDiagnostic {
    pub message: String,
    pub issues: Vec<ParserIssue>,
}

/// A parsed, read-only XML document. Never mutated by downstream
/// validators or evaluators; formatting produces new text that must be
/// re-parsed.
#[derive(Debug)]
pub struct XmlDocument<'input> {
    doc: roxmltree::Document<'input>,
}

impl<'input> XmlDocument<'input> {
    /// Parses `text` into a document. Malformed input becomes a normal
    /// `Err` value; no parser fault escapes this function.
    pub fn parse(text: &'input str) -> Result<Self, ParseDiagnostic> {
        match roxmltree::Document::parse(text) {
            Ok(doc) => Ok(Self { doc }),
            Err(e) => {
                let pos = e.pos();
                let message = format!("error on line {} at column {}: {}", pos.row, pos.col, e);
                let issues = extract_issues(&message);
                log::debug!("XML parse failed: {message}");
                Err(ParseDiagnostic { message, issues })
            }
        }
    }

    /// The document root (the node above the root element).
    pub fn root(&self) -> XmlNode<'_, 'input> {
        XmlNode::Tree(self.doc.root())
    }

    /// The root element.
    pub fn root_element(&self) -> XmlNode<'_, 'input> {
        XmlNode::Tree(self.doc.root_element())
    }
}

static ISSUE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)error on line\s+(\d+)\s+at column\s+(\d+)").unwrap());

/// Scans a diagnostic text for `error on line L at column C` records.
/// Best-effort: diagnostics in any other shape yield no issues. Order of
/// appearance is preserved.
pub fn extract_issues(error_text: &str) -> Vec<ParserIssue> {
    ISSUE_PATTERN
        .captures_iter(error_text)
        .filter_map(|caps| {
            let line: u32 = caps[1].parse().ok()?;
            let column: u32 = caps[2].parse().ok()?;
            Some(ParserIssue {
                line,
                column,
                message: format!("Line {line}, column {column}"),
            })
        })
        .collect()
}
