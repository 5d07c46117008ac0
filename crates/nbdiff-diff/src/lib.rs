//! Diff engine for nbdiff.
//!
//! Computes the two kinds of diff the renderer needs: a line-level edit
//! script that partitions two line sequences into equal/replace/delete/insert
//! runs, and a character-level fragment list used to highlight the edits
//! inside a replaced line.
//!
//! # Key Types
//!
//! - [`EditScript`] / [`Opcode`] / [`OpTag`] -- Line-level alignment
//! - [`Fragment`] / [`InlineOp`] -- Character-level alignment with semantic cleanup

pub mod inline;
pub mod opcodes;

pub use inline::{diff_chars, Fragment, InlineOp};
pub use opcodes::{diff_lines, EditScript, OpTag, Opcode};
