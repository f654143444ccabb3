//! Holds the state a workbench window carries between operations: the
//! XML text being edited, an optional stylesheet, and the rules built
//! from the last loaded schema.
//!
//! The session owns text and rules only; every operation re-parses the
//! current text, so stale trees cannot outlive an edit. No I/O happens
//! here or anywhere below.

use serde::Serialize;

use xmlbench_doc::{
    ParserIssue, XmlDocument, extract_namespaces, format_document, line_of_offset,
};
use xmlbench_xsd::{ValidationOutcome, XsdRules, build_rules, validate_text};
use xmlbench_xslt::{XsltRenderResult, render};

use crate::error::WorkbenchError;
use crate::query::{QueryOutcome, run_query};
use crate::suggest::{XPathSuggestion, suggest_for_offset};

/// Result of the well-formedness check; a report, not an error, since
/// malformed input is the expected case while typing.
#[derive(Debug, Clone, Serialize)]
pub struct WellFormedReport {
    pub ok: bool,
    pub summary: String,
    pub issues: Vec<ParserIssue>,
}

/// The auto-detected namespace declarations, default namespace split
/// out from the prefixed ones.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NamespaceReport {
    pub prefixes: Vec<(String, String)>,
    pub default_namespace: Option<String>,
}

#[derive(Debug, Default)]
pub struct Session {
    xml_text: String,
    xslt_text: Option<String>,
    rules: Option<XsdRules>,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    pub fn xml_text(&self) -> &str {
        &self.xml_text
    }

    pub fn set_xml(&mut self, text: impl Into<String>) {
        self.xml_text = text.into();
    }

    pub fn set_xslt(&mut self, text: impl Into<String>) {
        self.xslt_text = Some(text.into());
    }

    pub fn rules(&self) -> Option<&XsdRules> {
        self.rules.as_ref()
    }

    /// Parses a schema and keeps its rule set for later validations.
    /// Rules persist until the next `load_xsd`. A schema the subset
    /// cannot use still loads, as unsupported rules; only malformed
    /// schema text is an error.
    pub fn load_xsd(&mut self, xsd_text: &str) -> Result<&XsdRules, WorkbenchError> {
        let doc = XmlDocument::parse(xsd_text)?;
        let rules = build_rules(&doc);
        log::debug!(
            "loaded schema: supported={}, {} root name(s)",
            rules.supported,
            rules.root_names.len()
        );
        Ok(self.rules.insert(rules))
    }

    /// The well-formedness check behind the Validate action.
    pub fn check_well_formed(&self) -> WellFormedReport {
        match XmlDocument::parse(&self.xml_text) {
            Ok(_) => WellFormedReport {
                ok: true,
                summary: "XML is well-formed.".to_string(),
                issues: Vec::new(),
            },
            Err(diagnostic) => WellFormedReport {
                ok: false,
                summary: diagnostic.message,
                issues: diagnostic.issues,
            },
        }
    }

    /// Pretty-prints the current XML. The session text is not replaced;
    /// the caller decides whether to adopt the result.
    pub fn format_xml(&self) -> Result<String, WorkbenchError> {
        let doc = XmlDocument::parse(&self.xml_text)?;
        Ok(format_document(&doc))
    }

    /// Reports the namespace declarations found on the root element.
    pub fn detect_namespaces(&self) -> Result<NamespaceReport, WorkbenchError> {
        let doc = XmlDocument::parse(&self.xml_text)?;
        let mut report = NamespaceReport::default();
        for (prefix, uri) in extract_namespaces(&doc).iter() {
            if prefix.is_empty() {
                report.default_namespace = Some(uri.to_string());
            } else {
                report.prefixes.push((prefix.to_string(), uri.to_string()));
            }
        }
        Ok(report)
    }

    /// Validates the current XML against the loaded schema rules.
    pub fn validate_against_xsd(&self) -> Result<ValidationOutcome, WorkbenchError> {
        let rules = self.rules.as_ref().ok_or_else(|| {
            WorkbenchError::MissingInput("No XSD schema is loaded.".to_string())
        })?;
        Ok(validate_text(&self.xml_text, rules))
    }

    pub fn run_query(
        &self,
        expression: &str,
        namespace_block: &str,
    ) -> Result<QueryOutcome, WorkbenchError> {
        run_query(&self.xml_text, expression, namespace_block)
    }

    pub fn suggest(&self, offset: usize) -> Result<Vec<XPathSuggestion>, WorkbenchError> {
        suggest_for_offset(&self.xml_text, offset)
    }

    /// 1-based line of a cursor offset in the current XML text.
    pub fn cursor_line(&self, offset: usize) -> usize {
        line_of_offset(&self.xml_text, offset)
    }

    /// Applies the loaded stylesheet to the current XML. Namespaces
    /// detected on the XML root are in scope for stylesheet expressions.
    pub fn run_transform(&self) -> Result<XsltRenderResult, WorkbenchError> {
        let xslt_text = self.xslt_text.as_deref().ok_or_else(|| {
            WorkbenchError::MissingInput("No XSLT stylesheet is loaded.".to_string())
        })?;
        let xml_doc = XmlDocument::parse(&self.xml_text)?;
        let xslt_doc = XmlDocument::parse(xslt_text)?;
        let namespaces = extract_namespaces(&xml_doc);
        Ok(render(&xml_doc, &xslt_doc, &namespaces)?)
    }
}
