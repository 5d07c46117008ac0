//! Side-by-side rendering of one pair of line sequences.
//!
//! Long unchanged runs are collapsed: an equal run longer than twice the
//! context size keeps only `context` lines at each end and a placeholder
//! row carrying the number of hidden lines.

use std::fmt::Write as _;

use nbdiff_diff::{diff_lines, OpTag};

use crate::html;

/// Row highlight class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RowClass {
    Equal,
    Changed,
    Deleted,
    Added,
    /// No highlight (side-by-side media that did not change).
    Plain,
}

impl RowClass {
    pub fn css(&self) -> &'static str {
        match self {
            Self::Equal => "eq",
            Self::Changed => "chg",
            Self::Deleted => "sub",
            Self::Added => "add",
            Self::Plain => "",
        }
    }
}

/// One table row with optional 1-based line numbers on each side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineRow {
    pub left_no: Option<usize>,
    pub left: String,
    pub right_no: Option<usize>,
    pub right: String,
    pub class: RowClass,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Row {
    Line(LineRow),
    /// Placeholder for an elided run of equal lines.
    Collapsed { hidden: usize },
}

impl Row {
    fn line(
        left_no: Option<usize>,
        left: String,
        right_no: Option<usize>,
        right: String,
        class: RowClass,
    ) -> Self {
        Self::Line(LineRow {
            left_no,
            left,
            right_no,
            right,
            class,
        })
    }

    /// Whether this row shows a difference.
    pub fn is_change(&self) -> bool {
        match self {
            Self::Line(row) => !matches!(row.class, RowClass::Equal | RowClass::Plain),
            Self::Collapsed { .. } => false,
        }
    }
}

/// What a section describes. Drives the header style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// A cell present on both sides whose source changed.
    Cell,
    CellAdded,
    CellRemoved,
    Output,
}

/// A titled group of rows for one cell or one output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedSection {
    /// Header text; `None` renders the rows without a header.
    pub title: Option<String>,
    pub kind: SectionKind,
    pub rows: Vec<Row>,
}

impl RenderedSection {
    /// Returns `true` if any row shows a difference.
    pub fn has_changes(&self) -> bool {
        self.rows.iter().any(Row::is_change)
    }

    /// Number of collapsed placeholder rows.
    pub fn collapsed_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| matches!(r, Row::Collapsed { .. }))
            .count()
    }

    /// Serialize the section as `<tr>` rows of a four-column table.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        if let Some(title) = &self.title {
            let class = match self.kind {
                SectionKind::Output => "cell-header output",
                _ => "cell-header",
            };
            let _ = writeln!(
                out,
                r#"<tr class="{class}"><td colspan="4">{}</td></tr>"#,
                html::escape(title)
            );
        }
        for row in &self.rows {
            match row {
                Row::Line(line) => {
                    let number = |n: Option<usize>| n.map(|n| n.to_string()).unwrap_or_default();
                    let _ = writeln!(
                        out,
                        "<tr class=\"{}\">\n  <td class=\"lineno\">{}</td><td class=\"code\">{}</td>\n  <td class=\"lineno\">{}</td><td class=\"code\">{}</td>\n</tr>",
                        line.class.css(),
                        number(line.left_no),
                        line.left,
                        number(line.right_no),
                        line.right,
                    );
                }
                Row::Collapsed { hidden } => {
                    let _ = writeln!(
                        out,
                        r#"<tr class="gap"><td colspan="4">{hidden} unchanged lines hidden</td></tr>"#
                    );
                }
            }
        }
        out
    }
}

/// Render a side-by-side comparison of `left` and `right`.
///
/// Every line row reports the original 1-based line number on each side
/// where the line exists. Replace runs of unequal length are zipped pairwise;
/// the excess lines of the longer side get a blank counterpart.
pub fn render_section(
    title: impl Into<String>,
    kind: SectionKind,
    left: &[String],
    right: &[String],
    context: usize,
) -> RenderedSection {
    let mut rows = Vec::new();

    for op in &diff_lines(left, right) {
        let (l, r) = (op.left.clone(), op.right.clone());
        match op.tag {
            OpTag::Equal => {
                let len = l.len();
                let equal_row = |k: usize| {
                    let text = html::escape(&left[l.start + k]);
                    Row::line(
                        Some(l.start + k + 1),
                        text.clone(),
                        Some(r.start + k + 1),
                        text,
                        RowClass::Equal,
                    )
                };
                if len <= 2 * context {
                    rows.extend((0..len).map(equal_row));
                } else {
                    rows.extend((0..context).map(equal_row));
                    rows.push(Row::Collapsed {
                        hidden: len - 2 * context,
                    });
                    rows.extend((len - context..len).map(equal_row));
                }
            }
            OpTag::Replace => {
                let width = l.len().max(r.len());
                for k in 0..width {
                    let a = left.get(l.start + k).filter(|_| k < l.len());
                    let b = right.get(r.start + k).filter(|_| k < r.len());
                    let (left_html, right_html) = html::inline_markup(
                        a.map(String::as_str).unwrap_or(""),
                        b.map(String::as_str).unwrap_or(""),
                    );
                    rows.push(Row::line(
                        a.map(|_| l.start + k + 1),
                        left_html,
                        b.map(|_| r.start + k + 1),
                        right_html,
                        RowClass::Changed,
                    ));
                }
            }
            OpTag::Delete => {
                rows.extend(l.clone().map(|i| {
                    Row::line(
                        Some(i + 1),
                        html::deleted(&left[i]),
                        None,
                        String::new(),
                        RowClass::Deleted,
                    )
                }));
            }
            OpTag::Insert => {
                rows.extend(r.clone().map(|j| {
                    Row::line(
                        None,
                        String::new(),
                        Some(j + 1),
                        html::added(&right[j]),
                        RowClass::Added,
                    )
                }));
            }
        }
    }

    RenderedSection {
        title: Some(title.into()),
        kind,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("line {i}")).collect()
    }

    fn strs(s: &[&str]) -> Vec<String> {
        s.iter().map(|l| l.to_string()).collect()
    }

    fn line_rows(section: &RenderedSection) -> Vec<&LineRow> {
        section
            .rows
            .iter()
            .filter_map(|r| match r {
                Row::Line(line) => Some(line),
                Row::Collapsed { .. } => None,
            })
            .collect()
    }

    #[test]
    fn short_identical_run_shown_verbatim() {
        let a = lines(3);
        let section = render_section("t", SectionKind::Cell, &a, &a, 2);
        assert_eq!(section.rows.len(), 3);
        assert!(!section.has_changes());
        assert_eq!(section.collapsed_count(), 0);
    }

    #[test]
    fn long_identical_run_fully_collapsed() {
        let a = lines(10);
        let section = render_section("t", SectionKind::Cell, &a, &a, 2);
        assert!(!section.has_changes());
        assert_eq!(section.rows.len(), 5);
        assert_eq!(section.rows[2], Row::Collapsed { hidden: 6 });
    }

    #[test]
    fn collapse_boundary_exactly_twice_context() {
        let a = lines(4);
        let section = render_section("t", SectionKind::Cell, &a, &a, 2);
        assert_eq!(section.collapsed_count(), 0);
        assert_eq!(section.rows.len(), 4);
    }

    #[test]
    fn collapse_boundary_one_past_twice_context() {
        let a = lines(5);
        let section = render_section("t", SectionKind::Cell, &a, &a, 2);
        assert_eq!(section.collapsed_count(), 1);
        assert!(section.rows.contains(&Row::Collapsed { hidden: 1 }));
    }

    #[test]
    fn collapsed_run_keeps_original_line_numbers() {
        let mut a = lines(9);
        let mut b = a.clone();
        a.push("old".into());
        b.push("new".into());
        let section = render_section("t", SectionKind::Cell, &a, &b, 2);
        let numbers: Vec<Option<usize>> = line_rows(&section).iter().map(|r| r.left_no).collect();
        assert_eq!(numbers, vec![Some(1), Some(2), Some(8), Some(9), Some(10)]);
        assert_eq!(section.rows[2], Row::Collapsed { hidden: 5 });
    }

    #[test]
    fn replace_zips_unequal_runs() {
        let a = strs(&["keep", "x"]);
        let b = strs(&["keep", "y", "z"]);
        let section = render_section("t", SectionKind::Cell, &a, &b, 2);
        let rows = line_rows(&section);
        assert_eq!(rows.len(), 3);
        assert_eq!((rows[1].left_no, rows[1].right_no), (Some(2), Some(2)));
        assert_eq!((rows[2].left_no, rows[2].right_no), (None, Some(3)));
        assert_eq!(rows[2].left, "");
        assert!(rows[2].right.contains("diff-add"));
        assert!(rows[1..].iter().all(|r| r.class == RowClass::Changed));
    }

    #[test]
    fn delete_and_insert_are_one_sided() {
        let removed = render_section("t", SectionKind::CellRemoved, &strs(&["a", "b"]), &[], 2);
        for row in line_rows(&removed) {
            assert_eq!(row.class, RowClass::Deleted);
            assert!(row.right_no.is_none());
            assert!(row.right.is_empty());
        }
        let added = render_section("t", SectionKind::CellAdded, &[], &strs(&["a", "b"]), 2);
        let rows = line_rows(&added);
        assert_eq!(rows[1].right_no, Some(2));
        assert!(rows.iter().all(|r| r.left_no.is_none() && r.class == RowClass::Added));
    }

    #[test]
    fn zero_context_collapses_every_equal_run() {
        let a = strs(&["a", "b", "c"]);
        let b = strs(&["a", "X", "c"]);
        let section = render_section("t", SectionKind::Cell, &a, &b, 0);
        assert_eq!(section.collapsed_count(), 2);
        assert_eq!(line_rows(&section).len(), 1);
    }

    #[test]
    fn html_contains_header_and_escaped_text() {
        let a = strs(&["<b>"]);
        let section = render_section("Cell <1>", SectionKind::Output, &a, &a, 2);
        let html = section.to_html();
        assert!(html.contains(r#"<tr class="cell-header output"><td colspan="4">Cell &lt;1&gt;</td></tr>"#));
        assert!(html.contains("&lt;b&gt;"));
        assert!(html.contains(r#"<td class="lineno">1</td>"#));
    }

    #[test]
    fn gap_row_html() {
        let a = lines(6);
        let html = render_section("t", SectionKind::Cell, &a, &a, 1).to_html();
        assert!(html.contains("4 unchanged lines hidden"));
    }

    #[test]
    fn rendering_is_idempotent() {
        let a = strs(&["a", "b", "c", "d"]);
        let b = strs(&["a", "B", "c", "e", "f"]);
        let first = render_section("t", SectionKind::Cell, &a, &b, 1);
        let second = render_section("t", SectionKind::Cell, &a, &b, 1);
        assert_eq!(first, second);
        assert_eq!(first.to_html(), second.to_html());
    }
}
