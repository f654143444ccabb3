pub mod rules;
pub mod validate;

pub use rules::{XsdRules, build_rules};
pub use validate::{ValidationOutcome, validate_document, validate_text};
