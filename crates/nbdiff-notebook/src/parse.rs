//! nbformat v4 parser. v3 documents are upgraded before parsing.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::cell::{Cell, CellKind};
use crate::error::{NotebookError, Result};
use crate::output::Output;
use crate::text::{join_multiline, split_lines};
use crate::upgrade;

#[derive(Deserialize)]
struct RawNotebook {
    #[serde(default)]
    cells: Vec<RawCell>,
}

#[derive(Deserialize)]
struct RawCell {
    #[serde(default)]
    cell_type: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    source: Value,
    #[serde(default)]
    outputs: Vec<RawOutput>,
}

#[derive(Deserialize)]
struct RawOutput {
    output_type: String,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

/// Parse a notebook document into its code and markdown cells.
///
/// `None` models a document that does not exist on this side and yields no
/// cells, as does an empty byte buffer.
pub fn parse(bytes: Option<&[u8]>) -> Result<Vec<Cell>> {
    let bytes = match bytes {
        Some(b) if !b.is_empty() => b,
        _ => return Ok(Vec::new()),
    };

    let Value::Object(mut root) = serde_json::from_slice::<Value>(bytes)? else {
        return Err(NotebookError::Malformed(
            "top-level value is not an object".into(),
        ));
    };
    match root.get("nbformat").and_then(Value::as_u64) {
        Some(3) => upgrade::v3_to_v4(&mut root),
        Some(major) if major < 3 => return Err(NotebookError::UnsupportedVersion(major)),
        _ => {}
    }

    let notebook: RawNotebook = serde_json::from_value(Value::Object(root))?;

    let cells = notebook
        .cells
        .into_iter()
        .enumerate()
        .filter_map(|(i, raw)| {
            let kind = CellKind::from_cell_type(&raw.cell_type)?;
            let id = raw
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| format!("idx-{}", i + 1));
            let outputs = match kind {
                CellKind::Code => raw
                    .outputs
                    .iter()
                    .map(|o| Output::from_fields(&o.output_type, &o.fields))
                    .collect(),
                CellKind::Markdown => Vec::new(),
            };
            Some(Cell {
                id,
                kind,
                source: split_lines(&join_multiline(&raw.source)),
                outputs,
            })
        })
        .collect();

    Ok(cells)
}
