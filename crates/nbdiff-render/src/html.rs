//! Markup helpers.

use nbdiff_diff::{diff_chars, InlineOp};

/// Escape text for an HTML element body.
pub fn escape(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

/// Escape text for a double-quoted attribute value.
pub fn escape_attr(text: &str) -> String {
    html_escape::encode_double_quoted_attribute(text).into_owned()
}

/// Percent-encode a relative file name for use as an `href` value.
pub fn href(file_name: &str) -> String {
    escape_attr(&urlencoding::encode(file_name))
}

pub fn deleted(text: &str) -> String {
    format!(r#"<span class="diff-sub">{}</span>"#, escape(text))
}

pub fn added(text: &str) -> String {
    format!(r#"<span class="diff-add">{}</span>"#, escape(text))
}

/// Render two versions of a line with their character-level edits
/// highlighted. Returns `(left_markup, right_markup)`.
pub fn inline_markup(a: &str, b: &str) -> (String, String) {
    let mut left = String::new();
    let mut right = String::new();
    for fragment in diff_chars(a, b) {
        match fragment.op {
            InlineOp::Equal => {
                let text = escape(&fragment.text);
                left.push_str(&text);
                right.push_str(&text);
            }
            InlineOp::Delete => left.push_str(&deleted(&fragment.text)),
            InlineOp::Insert => right.push_str(&added(&fragment.text)),
        }
    }
    (left, right)
}
