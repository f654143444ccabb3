//! Encodes arbitrary text as an XPath 1.0 string expression.
//!
//! XPath 1.0 literals have no escape syntax, so a value containing both
//! quote kinds can only be expressed as a `concat()` of single-quoted
//! and double-quoted pieces.

/// Returns an expression that evaluates to exactly `value`.
pub fn encode_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{}'", value);
    }
    if !value.contains('"') {
        return format!("\"{}\"", value);
    }

    // Split on single quotes: the pieces are safe to single-quote, and
    // each removed quote becomes a double-quoted argument.
    let mut parts = Vec::new();
    for (index, piece) in value.split('\'').enumerate() {
        if index > 0 {
            parts.push("\"'\"".to_string());
        }
        if !piece.is_empty() {
            parts.push(format!("'{}'", piece));
        }
    }

    if parts.len() == 1 {
        return parts.remove(0);
    }
    format!("concat({})", parts.join(", "))
}
