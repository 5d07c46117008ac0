//! Revision access for nbdiff.
//!
//! Lists the documents that differ between two revisions of a repository
//! and materializes their content at a given revision. Paths are always
//! relative to the repository root.
//!
//! # Sources
//!
//! All sources implement the [`RevisionSource`] trait:
//!
//! - [`GitCli`] -- Shells out to the `git` executable
//! - [`InMemoryRevisions`] -- Map-backed source for tests and embedding

pub mod error;
pub mod git;
pub mod memory;
pub mod traits;

pub use error::{Result, VcsError};
pub use git::GitCli;
pub use memory::InMemoryRevisions;
pub use traits::RevisionSource;
