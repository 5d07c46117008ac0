//! In-memory revision source for testing and embedding.
//!
//! [`InMemoryRevisions`] maps revision names to file snapshots. Changed
//! paths are computed by comparing the two snapshots, so a revision only
//! needs to list the files that exist in it.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{Result, VcsError};
use crate::traits::RevisionSource;

/// A [`RevisionSource`] whose revisions are plain path-to-bytes maps.
#[derive(Clone, Debug, Default)]
pub struct InMemoryRevisions {
    revisions: HashMap<String, BTreeMap<String, Vec<u8>>>,
}

impl InMemoryRevisions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty revision.
    pub fn add_revision(&mut self, revision: impl Into<String>) {
        self.revisions.entry(revision.into()).or_default();
    }

    /// Store `content` at `path` in `revision`, creating the revision if needed.
    pub fn insert(
        &mut self,
        revision: impl Into<String>,
        path: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) {
        self.revisions
            .entry(revision.into())
            .or_default()
            .insert(path.into(), content.into());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_file(
        mut self,
        revision: impl Into<String>,
        path: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        self.insert(revision, path, content);
        self
    }

    fn snapshot(&self, revision: &str) -> Result<&BTreeMap<String, Vec<u8>>> {
        self.revisions
            .get(revision)
            .ok_or_else(|| VcsError::UnknownRevision(revision.to_string()))
    }
}

impl RevisionSource for InMemoryRevisions {
    fn changed_paths(&self, from: &str, to: &str, extension: &str) -> Result<Vec<String>> {
        let left = self.snapshot(from)?;
        let right = self.snapshot(to)?;
        let suffix = format!(".{extension}");
        let paths: BTreeSet<&String> = left.keys().chain(right.keys()).collect();
        Ok(paths
            .into_iter()
            .filter(|path| path.ends_with(&suffix))
            .filter(|path| left.get(*path) != right.get(*path))
            .cloned()
            .collect())
    }

    fn fetch(&self, revision: &str, path: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.snapshot(revision)?.get(path).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> InMemoryRevisions {
        InMemoryRevisions::new()
            .with_file("a", "same.ipynb", "x")
            .with_file("b", "same.ipynb", "x")
            .with_file("a", "edited.ipynb", "1")
            .with_file("b", "edited.ipynb", "2")
            .with_file("a", "gone.ipynb", "old")
            .with_file("b", "new/added.ipynb", "new")
            .with_file("b", "notes.txt", "ignored")
    }

    #[test]
    fn changed_paths_are_sorted_and_filtered() {
        let paths = source().changed_paths("a", "b", "ipynb").unwrap();
        assert_eq!(paths, vec!["edited.ipynb", "gone.ipynb", "new/added.ipynb"]);
    }

    #[test]
    fn other_extensions_are_selectable() {
        let paths = source().changed_paths("a", "b", "txt").unwrap();
        assert_eq!(paths, vec!["notes.txt"]);
    }

    #[test]
    fn absent_path_is_none() {
        let src = source();
        assert_eq!(src.fetch("a", "new/added.ipynb").unwrap(), None);
        assert_eq!(src.fetch("b", "new/added.ipynb").unwrap(), Some(b"new".to_vec()));
    }

    #[test]
    fn unknown_revision_is_an_error() {
        let err = source().fetch("zzz", "same.ipynb").unwrap_err();
        assert!(matches!(err, VcsError::UnknownRevision(ref r) if r == "zzz"));
        assert!(source().changed_paths("a", "zzz", "ipynb").is_err());
    }

    #[test]
    fn empty_revision_lists_everything_as_removed() {
        let mut src = source();
        src.add_revision("empty");
        let paths = src.changed_paths("b", "empty", "ipynb").unwrap();
        assert_eq!(paths.len(), 3);
    }
}
