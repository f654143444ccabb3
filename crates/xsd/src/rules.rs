//! Distills a schema document into the restricted rule set the
//! validator can actually check: allowed root names and required direct
//! children.
//!
//! Everything the subset does not understand is skipped, and a schema
//! that yields no usable rules is marked unsupported rather than
//! rejected.

use std::collections::BTreeMap;

use serde::Serialize;
use xmlbench_doc::{XmlDocument, XmlNode};

/// The checkable extract of a schema.
#[derive(Debug, Clone, Default, Serialize)]
pub struct XsdRules {
    pub supported: bool,
    pub reason: Option<String>,
    /// Top-level element declarations; any of them is an accepted root.
    pub root_names: Vec<String>,
    /// Required direct children per declared root, in declaration order.
    pub required_children: BTreeMap<String, Vec<String>>,
}

impl XsdRules {
    fn unsupported(reason: &str) -> Self {
        XsdRules {
            supported: false,
            reason: Some(reason.to_string()),
            ..XsdRules::default()
        }
    }
}

/// Builds the rule set from a parsed schema document.
///
/// The root must be an `xs:schema` element (matched by local name); its
/// direct `element` children with a `name` attribute become the root
/// names. For each, the first inline `complexType`, then its first
/// `sequence`, contributes the required children.
pub fn build_rules(xsd_doc: &XmlDocument<'_>) -> XsdRules {
    let root = xsd_doc.root_element();
    if root.local_name() != Some("schema") {
        return XsdRules::unsupported("Document root is not an XSD schema.");
    }

    let mut rules = XsdRules {
        supported: true,
        ..XsdRules::default()
    };

    for decl in element_declarations(&root) {
        let Some(name) = decl.attribute_value("name") else {
            continue;
        };
        rules.root_names.push(name.to_string());

        let required = required_children_of(&decl);
        if !required.is_empty() {
            rules.required_children.insert(name.to_string(), required);
        }
    }

    if rules.root_names.is_empty() {
        log::debug!("schema has no usable top-level element declarations");
        return XsdRules::unsupported("No top-level xs:element declarations found.");
    }
    rules
}

fn element_declarations<'a, 'input: 'a>(
    parent: &XmlNode<'a, 'input>,
) -> impl Iterator<Item = XmlNode<'a, 'input>> {
    parent
        .element_children()
        .filter(|child| child.local_name() == Some("element"))
}

fn required_children_of(decl: &XmlNode<'_, '_>) -> Vec<String> {
    let Some(complex_type) = first_child_named(decl, "complexType") else {
        return Vec::new();
    };
    let Some(sequence) = first_child_named(&complex_type, "sequence") else {
        return Vec::new();
    };

    element_declarations(&sequence)
        .filter(|child| is_required(child))
        .filter_map(|child| child.attribute_value("name").map(str::to_string))
        .collect()
}

fn first_child_named<'a, 'input: 'a>(
    parent: &XmlNode<'a, 'input>,
    local: &str,
) -> Option<XmlNode<'a, 'input>> {
    parent
        .element_children()
        .find(|child| child.local_name() == Some(local))
}

// A child is required when minOccurs is absent or numeric and positive.
// A non-numeric minOccurs makes the child optional, not an error.
fn is_required(child: &XmlNode<'_, '_>) -> bool {
    match child.attribute_value("minOccurs") {
        None => true,
        Some(value) => value.trim().parse::<f64>().is_ok_and(|n| n > 0.0),
    }
}
