use serde::{Deserialize, Serialize};

use crate::output::Output;

/// The kind of a retained notebook cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Code,
    Markdown,
}

impl CellKind {
    /// Map an nbformat `cell_type` to a retained kind.
    ///
    /// Returns `None` for `raw` and any unknown type; such cells are dropped.
    pub fn from_cell_type(cell_type: &str) -> Option<Self> {
        match cell_type {
            "code" => Some(Self::Code),
            "markdown" => Some(Self::Markdown),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Markdown => "markdown",
        }
    }
}

impl std::fmt::Display for CellKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One code or markdown cell, normalized for comparison.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    /// The notebook's own cell id, or `idx-<n>` for its 1-based position.
    pub id: String,
    pub kind: CellKind,
    /// Source text split into lines.
    pub source: Vec<String>,
    /// Recorded outputs. Always empty for markdown cells.
    pub outputs: Vec<Output>,
}

impl Cell {
    /// The source re-joined with `\n`.
    pub fn text(&self) -> String {
        self.source.join("\n")
    }

    /// Whether two cells have the same source once surrounding whitespace
    /// of the whole text is ignored.
    pub fn same_source(&self, other: &Cell) -> bool {
        self.text().trim() == other.text().trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(source: &[&str]) -> Cell {
        Cell {
            id: "c1".into(),
            kind: CellKind::Code,
            source: source.iter().map(|s| s.to_string()).collect(),
            outputs: Vec::new(),
        }
    }

    #[test]
    fn only_code_and_markdown_are_retained() {
        assert_eq!(CellKind::from_cell_type("code"), Some(CellKind::Code));
        assert_eq!(CellKind::from_cell_type("markdown"), Some(CellKind::Markdown));
        assert_eq!(CellKind::from_cell_type("raw"), None);
        assert_eq!(CellKind::from_cell_type("heading"), None);
    }

    #[test]
    fn kind_display() {
        assert_eq!(CellKind::Code.to_string(), "code");
        assert_eq!(CellKind::Markdown.to_string(), "markdown");
    }

    #[test]
    fn same_source_ignores_outer_whitespace() {
        let a = cell(&["", "x = 1", "  "]);
        let b = cell(&["x = 1"]);
        assert!(a.same_source(&b));
    }

    #[test]
    fn same_source_respects_inner_changes() {
        let a = cell(&["x = 1", "y = 2"]);
        let b = cell(&["x = 1", "y  = 2"]);
        assert!(!a.same_source(&b));
    }
}
