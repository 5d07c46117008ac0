//! Type-dispatched comparison of one pair of cell outputs.
//!
//! Outputs are paired by index by the caller; either side may be missing.
//! The comparison picks the most meaningful representation available:
//!
//! | left / right tags      | section                                  |
//! |------------------------|------------------------------------------|
//! | differ (or missing)    | untitled "Output type changed" notice    |
//! | `stream`               | line diff of the stream text             |
//! | rich display           | image, else `text/plain`, else JSON      |
//! | `error`                | line diff of the ANSI-stripped traceback |
//! | anything else          | nothing                                  |

use std::sync::LazyLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use nbdiff_notebook::output::{MIME_PNG, MIME_SVG, MIME_TEXT};
use nbdiff_notebook::{canonical_json, split_lines, MimeBundle, Output};
use regex::Regex;
use serde_json::Value;

use crate::html;
use crate::section::{render_section, LineRow, RenderedSection, Row, RowClass, SectionKind};

static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]").expect("ANSI escape pattern is valid")
});

const MISSING: &str = "missing";

/// Compare two outputs occupying the same position.
///
/// Returns `None` when there is nothing worth showing. A returned section
/// may still contain only unchanged rows; callers decide whether to keep it
/// with [`RenderedSection::has_changes`].
pub fn compare_outputs(
    left: Option<&Output>,
    right: Option<&Output>,
    context: usize,
) -> Option<RenderedSection> {
    let left_tag = left.map_or(MISSING, Output::tag);
    let right_tag = right.map_or(MISSING, Output::tag);
    if left.is_none() && right.is_none() {
        return None;
    }
    if left_tag != right_tag {
        return Some(type_changed(left_tag, right_tag));
    }

    match (left?, right?) {
        (Output::Stream { text: a, .. }, Output::Stream { text: b, .. }) => Some(render_section(
            "Output (stream)",
            SectionKind::Output,
            a,
            b,
            context,
        )),
        (Output::Error { traceback: a, .. }, Output::Error { traceback: b, .. }) => {
            let a = strip_ansi(a);
            let b = strip_ansi(b);
            if a == b {
                return None;
            }
            Some(render_section(
                "Error output",
                SectionKind::Output,
                &split_lines(&a),
                &split_lines(&b),
                context,
            ))
        }
        (a, b) => match (a.mime_bundle(), b.mime_bundle()) {
            (Some(a), Some(b)) => Some(compare_bundles(a, b, context)),
            _ => None,
        },
    }
}

fn type_changed(left_tag: &str, right_tag: &str) -> RenderedSection {
    RenderedSection {
        title: None,
        kind: SectionKind::Output,
        rows: vec![Row::Line(LineRow {
            left_no: None,
            left: html::escape(&format!("Output type changed: {left_tag}")),
            right_no: None,
            right: html::escape(&format!("Output type changed: {right_tag}")),
            class: RowClass::Changed,
        })],
    }
}

fn compare_bundles(a: &MimeBundle, b: &MimeBundle, context: usize) -> RenderedSection {
    let has = |mime: &str| a.contains_key(mime) || b.contains_key(mime);

    if has(MIME_PNG) {
        return compare_images(a, b, Image::Png);
    }
    if has(MIME_SVG) {
        return compare_images(a, b, Image::Svg);
    }
    if has(MIME_TEXT) {
        return render_section(
            "Output (text)",
            SectionKind::Output,
            &text_lines(a.get(MIME_TEXT)),
            &text_lines(b.get(MIME_TEXT)),
            context,
        );
    }
    render_section(
        "Output (data)",
        SectionKind::Output,
        &split_lines(&canonical_json(a)),
        &split_lines(&canonical_json(b)),
        context,
    )
}

#[derive(Clone, Copy)]
enum Image {
    Png,
    Svg,
}

impl Image {
    fn mime(self) -> &'static str {
        match self {
            Self::Png => MIME_PNG,
            Self::Svg => MIME_SVG,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Png => "PNG image",
            Self::Svg => "SVG image",
        }
    }

    fn markup(self, payload: &str) -> String {
        match self {
            Self::Png => {
                let data: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
                format!(
                    r#"<img src="data:image/png;base64,{}" />"#,
                    html::escape_attr(&data)
                )
            }
            Self::Svg => format!(
                r#"<img src="data:image/svg+xml;base64,{}" />"#,
                STANDARD.encode(payload)
            ),
        }
    }
}

fn compare_images(a: &MimeBundle, b: &MimeBundle, image: Image) -> RenderedSection {
    let left = a.get(image.mime()).map(payload_text);
    let right = b.get(image.mime()).map(payload_text);
    let cell = |payload: &Option<String>| match payload {
        Some(p) => image.markup(p),
        None => format!("<em>{MISSING}</em>"),
    };
    let class = if left == right {
        RowClass::Plain
    } else {
        RowClass::Changed
    };
    RenderedSection {
        title: Some(format!("Output ({})", image.label())),
        kind: SectionKind::Output,
        rows: vec![Row::Line(LineRow {
            left_no: None,
            left: cell(&left),
            right_no: None,
            right: cell(&right),
            class,
        })],
    }
}

fn payload_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn text_lines(value: Option<&Value>) -> Vec<String> {
    value.map(|v| split_lines(&payload_text(v))).unwrap_or_default()
}

/// Join traceback entries with `\n`, removing terminal colour codes.
fn strip_ansi(traceback: &[String]) -> String {
    ANSI_ESCAPE
        .replace_all(&traceback.join("\n"), "")
        .into_owned()
}
