//! HTML rendering for nbdiff.
//!
//! Turns edit scripts into side-by-side table rows, compares cell outputs by
//! type, and wraps the resulting sections into a self-contained page.
//!
//! # Key Types
//!
//! - [`RenderedSection`] / [`Row`] / [`LineRow`] -- Rendered rows of one cell or output
//! - [`compare_outputs`] -- Type-dispatched output comparison
//! - [`PageSpec`] / [`Page`] / [`assemble`] -- Page assembly with prev/next navigation

pub mod html;
pub mod output;
pub mod page;
pub mod section;

pub use output::compare_outputs;
pub use page::{artifact_name, artifact_names, assemble, Page, PageSpec};
pub use section::{render_section, LineRow, RenderedSection, Row, RowClass, SectionKind};
