//! Checks a document against built [`XsdRules`]: root name plus the
//! presence of required direct children.

use serde::Serialize;
use xmlbench_doc::XmlDocument;

use crate::rules::XsdRules;

/// The outcome handed to the UI: a one-line summary plus per-problem
/// details.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationOutcome {
    pub ok: bool,
    pub summary: String,
    pub details: Vec<String>,
}

impl ValidationOutcome {
    fn failure(summary: impl Into<String>, details: Vec<String>) -> Self {
        ValidationOutcome {
            ok: false,
            summary: summary.into(),
            details,
        }
    }
}

/// Validates raw text: empty input and malformed XML become failing
/// outcomes rather than errors.
pub fn validate_text(xml_text: &str, rules: &XsdRules) -> ValidationOutcome {
    if xml_text.trim().is_empty() {
        return ValidationOutcome::failure("XML document is empty.", Vec::new());
    }
    match XmlDocument::parse(xml_text) {
        Ok(doc) => validate_document(&doc, rules),
        Err(diagnostic) => ValidationOutcome::failure(
            diagnostic.message.clone(),
            diagnostic
                .issues
                .iter()
                .map(|issue| issue.message.clone())
                .collect(),
        ),
    }
}

pub fn validate_document(doc: &XmlDocument<'_>, rules: &XsdRules) -> ValidationOutcome {
    if !rules.supported {
        let reason = rules
            .reason
            .clone()
            .unwrap_or_else(|| "Schema is not supported.".to_string());
        return ValidationOutcome::failure(reason, Vec::new());
    }

    // Rule names come from the schema's `name` attributes, which are
    // plain; documents are matched by their qualified tag name, so a
    // prefixed root never satisfies an unprefixed declaration.
    let root = doc.root_element();
    let root_name = root.qualified_name().unwrap_or_default();

    if !rules.root_names.contains(&root_name) {
        let expected = rules
            .root_names
            .iter()
            .map(|name| format!("<{name}>"))
            .collect::<Vec<_>>()
            .join(", ");
        return ValidationOutcome::failure(
            format!("Root element mismatch. XML root is <{root_name}>."),
            vec![format!("Expected one of: {expected}")],
        );
    }

    let mut details = Vec::new();
    if let Some(required) = rules.required_children.get(&root_name) {
        let present: Vec<String> = root
            .element_children()
            .filter_map(|child| child.qualified_name())
            .collect();
        for child in required {
            if !present.iter().any(|name| name == child) {
                details.push(format!(
                    "Missing required direct child <{child}> under <{root_name}>."
                ));
            }
        }
    }

    if details.is_empty() {
        ValidationOutcome {
            ok: true,
            summary: "Basic XSD checks passed (root + required direct children).".to_string(),
            details,
        }
    } else {
        ValidationOutcome::failure("Basic XSD checks found issues.", details)
    }
}
