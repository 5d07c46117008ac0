//! Notebook document model for nbdiff.
//!
//! Turns the raw bytes of an `.ipynb` file into an ordered list of
//! normalized [`Cell`] records. Only code and markdown cells survive
//! parsing; every other cell kind is dropped. nbformat 3 documents are
//! upgraded to the v4 layout first.
//!
//! # Key Types
//!
//! - [`Cell`] / [`CellKind`] -- One notebook cell with its source lines
//! - [`Output`] / [`MimeBundle`] -- Typed execution outputs of a code cell
//! - [`parse`] -- Bytes (or an absent document) to cells

pub mod cell;
pub mod error;
pub mod output;
pub mod parse;
pub mod text;
mod upgrade;

pub use cell::{Cell, CellKind};
pub use error::{NotebookError, Result};
pub use output::{canonical_json, MimeBundle, Output};
pub use parse::parse;
pub use text::split_lines;
