//! The diff run: enumerate, diff, assemble, write, open.
//!
//! A run has two phases. First every changed document is fetched, parsed,
//! and diffed into sections; documents without sections are dropped. Then
//! the remaining documents are assembled into pages, so that previous/next
//! links only ever point at pages that were actually written.

use std::path::PathBuf;

use nbdiff_notebook::{parse, Cell};
use nbdiff_render::{
    artifact_names, assemble, compare_outputs, render_section, PageSpec, RenderedSection,
    SectionKind,
};
use nbdiff_vcs::RevisionSource;
use tracing::{debug, info, warn};

use crate::config::DiffConfig;
use crate::error::{SdkError, SdkResult};
use crate::ports::{ArtifactSink, Viewer};

/// How a run ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// No document with the configured extension changed.
    NothingToDo,
    /// Documents changed, but none had a visible difference.
    Unchanged,
    /// Pages were written, in enumeration order.
    Written { pages: Vec<PathBuf> },
}

/// A document skipped because it could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentFailure {
    pub path: String,
    pub error: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub failures: Vec<DocumentFailure>,
}

/// Notebook diff runner over a revision source.
pub struct NbDiff<S> {
    source: S,
    config: DiffConfig,
}

impl<S: RevisionSource> NbDiff<S> {
    pub fn new(source: S, config: DiffConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Sections for one document between two revisions.
    ///
    /// A document absent on one side diffs against an empty notebook.
    pub fn diff_document(
        &self,
        path: &str,
        from: &str,
        to: &str,
    ) -> SdkResult<Vec<RenderedSection>> {
        let left = self.source.fetch(from, path)?;
        let right = self.source.fetch(to, path)?;
        let notebook_error = |source| SdkError::Notebook {
            path: path.to_string(),
            source,
        };
        let left = parse(left.as_deref()).map_err(notebook_error)?;
        let right = parse(right.as_deref()).map_err(notebook_error)?;
        debug!(path, left = left.len(), right = right.len(), "parsed cells");
        Ok(diff_notebook(path, &left, &right, self.config.context))
    }

    /// Diff every changed document between `from` and `to` and write one
    /// page per document that has visible differences.
    pub fn run(
        &self,
        from: &str,
        to: &str,
        sink: &mut dyn ArtifactSink,
        viewer: &mut dyn Viewer,
    ) -> SdkResult<RunReport> {
        let paths = self.source.changed_paths(from, to, &self.config.extension)?;
        info!(from, to, count = paths.len(), "changed documents");
        if paths.is_empty() {
            return Ok(RunReport {
                outcome: RunOutcome::NothingToDo,
                failures: Vec::new(),
            });
        }

        let mut failures = Vec::new();
        let mut documents = Vec::new();
        for path in paths {
            match self.diff_document(&path, from, to) {
                Ok(sections) if sections.is_empty() => {
                    debug!(path = %path, "no visible differences");
                }
                Ok(sections) => documents.push((path, sections)),
                Err(err @ SdkError::Notebook { .. }) if !self.config.fail_fast => {
                    warn!(path = %path, error = %err, "skipping document");
                    failures.push(DocumentFailure {
                        path,
                        error: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        let paths: Vec<&str> = documents.iter().map(|(path, _)| path.as_str()).collect();
        let names = artifact_names(&paths);
        let mut pages = Vec::with_capacity(documents.len());
        for (i, (path, sections)) in documents.into_iter().enumerate() {
            let spec = PageSpec {
                document_path: path,
                file_name: names[i].clone(),
                left_label: from.to_string(),
                right_label: to.to_string(),
                sections,
                prev: i.checked_sub(1).map(|p| names[p].clone()),
                next: names.get(i + 1).cloned(),
                math_toggle: self.config.math_toggle,
            };
            let page = assemble(&spec);
            pages.push(sink.write(&page.file_name, &page.html)?);
        }

        let outcome = match pages.first() {
            None => RunOutcome::Unchanged,
            Some(first) => {
                if self.config.open_viewer {
                    if let Err(err) = viewer.open(first) {
                        warn!(error = %err, "could not open viewer");
                    }
                }
                RunOutcome::Written { pages }
            }
        };
        Ok(RunReport { outcome, failures })
    }
}

/// Sections describing how `right` differs from `left`.
///
/// Cells and their outputs are aligned by position. A cell present on one
/// side only is shown in full as added or removed, together with its
/// outputs.
pub fn diff_notebook(
    path: &str,
    left: &[Cell],
    right: &[Cell],
    context: usize,
) -> Vec<RenderedSection> {
    let mut sections = Vec::new();
    for idx in 0..left.len().max(right.len()) {
        let number = idx + 1;
        match (left.get(idx), right.get(idx)) {
            (None, Some(cell)) => {
                sections.push(render_section(
                    format!("{path} — Cell {number} [{}] (added)", cell.kind),
                    SectionKind::CellAdded,
                    &[],
                    &cell.source,
                    context,
                ));
                sections.extend(
                    cell.outputs
                        .iter()
                        .filter_map(|out| compare_outputs(None, Some(out), context)),
                );
            }
            (Some(cell), None) => {
                sections.push(render_section(
                    format!("{path} — Cell {number} [{}] (removed)", cell.kind),
                    SectionKind::CellRemoved,
                    &cell.source,
                    &[],
                    context,
                ));
                sections.extend(
                    cell.outputs
                        .iter()
                        .filter_map(|out| compare_outputs(Some(out), None, context)),
                );
            }
            (Some(l), Some(r)) => diff_cell_pair(path, number, l, r, context, &mut sections),
            (None, None) => {}
        }
    }
    sections
}

fn diff_cell_pair(
    path: &str,
    number: usize,
    left: &Cell,
    right: &Cell,
    context: usize,
    sections: &mut Vec<RenderedSection>,
) {
    let cell_changed = !left.same_source(right) || left.kind != right.kind;
    if cell_changed {
        let kinds = if left.kind == right.kind {
            left.kind.to_string()
        } else {
            format!("{}→{}", left.kind, right.kind)
        };
        sections.push(render_section(
            format!("{path} — Cell {number} [{kinds}]"),
            SectionKind::Cell,
            &left.source,
            &right.source,
            context,
        ));
    }

    let counts_differ = left.outputs.len() != right.outputs.len();
    for k in 0..left.outputs.len().max(right.outputs.len()) {
        let Some(section) = compare_outputs(left.outputs.get(k), right.outputs.get(k), context)
        else {
            continue;
        };
        if cell_changed || counts_differ || section.has_changes() {
            sections.push(section);
        }
    }
}
