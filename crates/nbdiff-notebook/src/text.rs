//! Text helpers shared by the parser and the renderers.

use serde_json::Value;

/// Split text into lines on `\n` and `\r\n` boundaries.
///
/// A trailing newline does not produce a trailing empty line, so
/// `"a\nb\n"` and `"a\nb"` both yield `["a", "b"]`.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_owned).collect()
}

/// Flatten an nbformat "multiline string" into a single string.
///
/// nbformat stores long text either as one string or as a list of string
/// fragments that must be concatenated. Anything else flattens to empty.
pub(crate) fn join_multiline(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(parts) => parts.iter().filter_map(Value::as_str).collect(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn split_ignores_trailing_newline() {
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b"]);
        assert_eq!(split_lines("a\nb"), vec!["a", "b"]);
    }

    #[test]
    fn split_handles_crlf() {
        assert_eq!(split_lines("x\r\ny\r\n"), vec!["x", "y"]);
    }

    #[test]
    fn split_keeps_inner_blank_lines() {
        assert_eq!(split_lines("a\n\nb"), vec!["a", "", "b"]);
    }

    #[test]
    fn split_empty_is_empty() {
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn join_list_fragments() {
        assert_eq!(join_multiline(&json!(["a\n", "b"])), "a\nb");
    }

    #[test]
    fn join_plain_string() {
        assert_eq!(join_multiline(&json!("hello")), "hello");
    }

    #[test]
    fn join_non_text_is_empty() {
        assert_eq!(join_multiline(&json!(null)), "");
        assert_eq!(join_multiline(&json!(42)), "");
    }
}
