//! In-place upgrade of nbformat 3 documents to the v4 layout.
//!
//! v3 nests cells inside `worksheets`, calls a code cell's source `input`,
//! names outputs `pyout`/`pyerr`, and stores rich representations under
//! short keys (`png`, `text`, ...) at the top level of the output. Headings
//! are a cell kind of their own. After the upgrade the document parses like
//! any v4 notebook.

use serde_json::{Map, Value};

use crate::text::join_multiline;

/// v3 short representation keys and their MIME types.
const MIME_KEYS: [(&str, &str); 9] = [
    ("text", "text/plain"),
    ("html", "text/html"),
    ("svg", "image/svg+xml"),
    ("png", "image/png"),
    ("jpeg", "image/jpeg"),
    ("pdf", "application/pdf"),
    ("latex", "text/latex"),
    ("json", "application/json"),
    ("javascript", "application/javascript"),
];

/// Rewrite a v3 notebook object into v4 shape. Cells of every worksheet are
/// concatenated in order.
pub(crate) fn v3_to_v4(notebook: &mut Map<String, Value>) {
    let cells: Vec<Value> = take_array(notebook, "worksheets")
        .into_iter()
        .flat_map(|worksheet| match worksheet {
            Value::Object(mut worksheet) => take_array(&mut worksheet, "cells"),
            _ => Vec::new(),
        })
        .map(upgrade_cell)
        .collect();
    notebook.insert("cells".into(), Value::Array(cells));
    notebook.insert("nbformat".into(), Value::from(4));
}

fn upgrade_cell(cell: Value) -> Value {
    let Value::Object(mut cell) = cell else {
        return cell;
    };
    let cell_type = cell
        .get("cell_type")
        .and_then(Value::as_str)
        .map(str::to_owned);
    match cell_type.as_deref() {
        Some("code") => {
            rename(&mut cell, "input", "source");
            rename(&mut cell, "prompt_number", "execution_count");
            let outputs = take_array(&mut cell, "outputs")
                .into_iter()
                .map(upgrade_output)
                .collect();
            cell.insert("outputs".into(), Value::Array(outputs));
        }
        Some("heading") => {
            let level = cell
                .get("level")
                .and_then(Value::as_u64)
                .unwrap_or(1)
                .clamp(1, 6) as usize;
            let text = cell.get("source").map(join_multiline).unwrap_or_default();
            let title = text.lines().collect::<Vec<_>>().join(" ");
            cell.insert("cell_type".into(), Value::from("markdown"));
            cell.insert(
                "source".into(),
                Value::String(format!("{} {title}", "#".repeat(level))),
            );
        }
        _ => {}
    }
    Value::Object(cell)
}

fn upgrade_output(output: Value) -> Value {
    let Value::Object(mut output) = output else {
        return output;
    };
    let output_type = output
        .get("output_type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    match output_type.as_str() {
        "pyout" | "display_data" => {
            if output_type == "pyout" {
                output.insert("output_type".into(), Value::from("execute_result"));
                rename(&mut output, "prompt_number", "execution_count");
            }
            let keys: Vec<String> = output
                .keys()
                .filter(|k| !matches!(k.as_str(), "output_type" | "execution_count" | "metadata"))
                .cloned()
                .collect();
            let mut data = Map::new();
            for key in keys {
                if let Some(value) = output.remove(&key) {
                    data.insert(mime_type(&key).to_string(), value);
                }
            }
            output.insert("data".into(), Value::Object(data));
        }
        "pyerr" => {
            output.insert("output_type".into(), Value::from("error"));
        }
        "stream" => rename(&mut output, "stream", "name"),
        _ => {}
    }
    Value::Object(output)
}

fn mime_type(key: &str) -> &str {
    MIME_KEYS
        .iter()
        .find(|(short, _)| *short == key)
        .map_or(key, |&(_, mime)| mime)
}

fn rename(map: &mut Map<String, Value>, from: &str, to: &str) {
    if let Some(value) = map.remove(from) {
        map.insert(to.into(), value);
    }
}

fn take_array(map: &mut Map<String, Value>, key: &str) -> Vec<Value> {
    match map.remove(key) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}
