//! Typed execution outputs.
//!
//! nbformat stores outputs as loosely typed JSON objects discriminated by an
//! `output_type` field. They are mapped onto the closed [`Output`] enum here;
//! unknown types keep only their tag so a type change is still detectable.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::text::join_multiline;

/// MIME type to representation. Keys are always iterated in sorted order.
pub type MimeBundle = BTreeMap<String, Value>;

pub const MIME_PNG: &str = "image/png";
pub const MIME_SVG: &str = "image/svg+xml";
pub const MIME_TEXT: &str = "text/plain";

/// One recorded result of executing a code cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Output {
    /// Text written to stdout or stderr.
    Stream { name: String, text: Vec<String> },
    /// Rich display published by the kernel.
    DisplayData { data: MimeBundle },
    /// The value of the cell's last expression.
    ExecuteResult {
        data: MimeBundle,
        execution_count: Option<u64>,
    },
    /// An exception raised while running the cell.
    Error {
        name: String,
        value: String,
        traceback: Vec<String>,
    },
    /// An output type this crate does not model.
    Other { output_type: String },
}

impl Output {
    /// The nbformat `output_type` tag of this output.
    pub fn tag(&self) -> &str {
        match self {
            Self::Stream { .. } => "stream",
            Self::DisplayData { .. } => "display_data",
            Self::ExecuteResult { .. } => "execute_result",
            Self::Error { .. } => "error",
            Self::Other { output_type } => output_type,
        }
    }

    /// The MIME bundle of rich outputs, `None` for the other variants.
    pub fn mime_bundle(&self) -> Option<&MimeBundle> {
        match self {
            Self::DisplayData { data } | Self::ExecuteResult { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Build an output from the fields of one nbformat output object.
    pub(crate) fn from_fields(output_type: &str, fields: &Map<String, Value>) -> Self {
        match output_type {
            "stream" => Self::Stream {
                name: fields
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or("stdout")
                    .to_string(),
                text: fields
                    .get("text")
                    .map(|t| crate::split_lines(&join_multiline(t)))
                    .unwrap_or_default(),
            },
            "display_data" => Self::DisplayData {
                data: mime_bundle(fields.get("data")),
            },
            "execute_result" => Self::ExecuteResult {
                data: mime_bundle(fields.get("data")),
                execution_count: fields.get("execution_count").and_then(Value::as_u64),
            },
            "error" => Self::Error {
                name: string_field(fields, "ename"),
                value: string_field(fields, "evalue"),
                traceback: fields
                    .get("traceback")
                    .and_then(Value::as_array)
                    .map(|lines| {
                        lines
                            .iter()
                            .filter_map(Value::as_str)
                            .map(str::to_owned)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            other => Self::Other {
                output_type: other.to_string(),
            },
        }
    }
}

fn string_field(fields: &Map<String, Value>, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// JSON MIME types keep their structured value; every other type is text.
fn is_json_mime(mime: &str) -> bool {
    mime == "application/json" || mime.ends_with("+json")
}

fn mime_bundle(data: Option<&Value>) -> MimeBundle {
    let Some(Value::Object(map)) = data else {
        return MimeBundle::new();
    };
    map.iter()
        .map(|(mime, value)| {
            let value = if !is_json_mime(mime) && (value.is_string() || value.is_array()) {
                Value::String(join_multiline(value))
            } else {
                value.clone()
            };
            (mime.clone(), value)
        })
        .collect()
}

/// Serialize a MIME bundle as 2-space indented JSON with every object's keys
/// sorted, at every nesting level.
///
/// The output depends only on content, never on the key order of the source
/// document.
pub fn canonical_json(bundle: &MimeBundle) -> String {
    let sorted: Map<String, Value> = bundle
        .iter()
        .map(|(k, v)| (k.clone(), canonicalize(v)))
        .collect();
    serde_json::to_string_pretty(&Value::Object(sorted)).unwrap_or_default()
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), canonicalize(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
