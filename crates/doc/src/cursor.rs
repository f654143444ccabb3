//! Infers the stack of open elements at a text offset.
//!
//! This is a textual best-effort scan, not a parse: it must work on the
//! malformed, partially-typed XML that sits in an editor while the user
//! is still writing it.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?([A-Za-z_][\w:.\-]*)(\s[^<>]*)?>").unwrap());

/// Replays the tag-open/close sequence over `text[..offset]` and returns
/// the names of the currently-open elements, root first.
///
/// A close tag pops the stack only when its name matches the top;
/// mismatched close tags are ignored. Self-closing tags never push.
pub fn infer_element_path(text: &str, offset: usize) -> Vec<String> {
    let mut end = offset.min(text.len());
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    let snippet = &text[..end];

    let mut stack: Vec<String> = Vec::new();
    for caps in TAG_PATTERN.captures_iter(snippet) {
        let full_tag = caps.get(0).map(|m| m.as_str()).unwrap_or("");
        let tag_name = &caps[1];
        if full_tag.starts_with("</") {
            if stack.last().is_some_and(|top| top == tag_name) {
                stack.pop();
            }
        } else if !is_self_closing(full_tag) {
            stack.push(tag_name.to_string());
        }
    }
    stack
}

// A tag literal ending in `/>`, with optional whitespace before the slash
// and the angle bracket.
fn is_self_closing(full_tag: &str) -> bool {
    full_tag
        .strip_suffix('>')
        .is_some_and(|body| body.trim_end().ends_with('/'))
}

/// 1-based line number of a character offset.
pub fn line_of_offset(text: &str, offset: usize) -> usize {
    let mut end = offset.min(text.len());
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].matches('\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_at_text_offset() {
        let xml = "<root><book><title>Hi</title></book></root>";
        let offset = xml.find("Hi").unwrap() + 1;
        assert_eq!(infer_element_path(xml, offset), vec!["root", "book", "title"]);
    }

    #[test]
    fn test_closed_elements_are_popped() {
        let xml = "<root><a></a><b>";
        assert_eq!(infer_element_path(xml, xml.len()), vec!["root", "b"]);
    }

    #[test]
    fn test_mismatched_close_is_ignored() {
        let xml = "<root><a></wrong><b>";
        assert_eq!(infer_element_path(xml, xml.len()), vec!["root", "a", "b"]);
    }

    #[test]
    fn test_self_closing_never_pushes() {
        let xml = r#"<root><img src="x"/><br /><item>"#;
        assert_eq!(infer_element_path(xml, xml.len()), vec!["root", "item"]);
    }

    #[test]
    fn test_partial_tag_under_cursor() {
        let xml = "<root><book><tit";
        assert_eq!(infer_element_path(xml, xml.len()), vec!["root", "book"]);
    }

    #[test]
    fn test_offset_past_end_is_clamped() {
        let xml = "<root>";
        assert_eq!(infer_element_path(xml, 9999), vec!["root"]);
    }

    #[test]
    fn test_namespaced_tag_names() {
        let xml = "<bk:books><bk:book>";
        assert_eq!(infer_element_path(xml, xml.len()), vec!["bk:books", "bk:book"]);
    }

    #[test]
    fn test_line_of_offset() {
        let text = "a\nbb\nccc";
        assert_eq!(line_of_offset(text, 0), 1);
        assert_eq!(line_of_offset(text, 3), 2);
        assert_eq!(line_of_offset(text, text.len()), 3);
    }
}
