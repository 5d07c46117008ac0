use crate::error::Result;

/// Read-only access to files at named revisions.
///
/// Implementations must satisfy these invariants:
/// - Paths are repository-relative and use `/` as separator.
/// - A path that does not exist at a revision is `Ok(None)`, never an error.
/// - Failures to reach the repository itself (unknown revision, missing
///   executable, unreadable listing) are `Err` and are not retried.
pub trait RevisionSource {
    /// Paths ending in `.<extension>` whose content differs between `from`
    /// and `to`, in the order the source reports them.
    fn changed_paths(&self, from: &str, to: &str, extension: &str) -> Result<Vec<String>>;

    /// Raw bytes of `path` at `revision`, or `None` if it does not exist there.
    fn fetch(&self, revision: &str, path: &str) -> Result<Option<Vec<u8>>>;
}
