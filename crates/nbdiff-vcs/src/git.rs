//! [`RevisionSource`] backed by the `git` command line.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::{Result, VcsError};
use crate::traits::RevisionSource;

/// Runs `git` against a repository's top-level directory.
#[derive(Clone, Debug)]
pub struct GitCli {
    root: PathBuf,
}

impl GitCli {
    /// Locate the repository containing the current directory.
    pub fn discover() -> Result<Self> {
        Self::discover_from(".")
    }

    /// Locate the repository containing `dir`.
    pub fn discover_from(dir: impl AsRef<Path>) -> Result<Self> {
        let out = run_git(dir.as_ref(), &["rev-parse", "--show-toplevel"])?;
        let root = utf8("rev-parse --show-toplevel", out)?;
        let root = PathBuf::from(root.trim_end());
        debug!(root = %root.display(), "resolved repository root");
        Ok(Self { root })
    }

    /// Use `root` as the repository top level without asking git.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn git(&self, args: &[&str]) -> Result<Vec<u8>> {
        run_git(&self.root, args)
    }
}

impl RevisionSource for GitCli {
    fn changed_paths(&self, from: &str, to: &str, extension: &str) -> Result<Vec<String>> {
        let pattern = format!("*.{extension}");
        let args = ["diff", "--name-only", "-z", from, to, "--", pattern.as_str()];
        let out = self.git(&args)?;
        let paths = parse_listing(&utf8(&args.join(" "), out)?);
        debug!(from, to, count = paths.len(), "listed changed documents");
        Ok(paths)
    }

    fn fetch(&self, revision: &str, path: &str) -> Result<Option<Vec<u8>>> {
        let listing = self.git(&[
            "--literal-pathspecs",
            "ls-tree",
            "--name-only",
            revision,
            "--",
            path,
        ])?;
        if listing.iter().all(u8::is_ascii_whitespace) {
            debug!(revision, path, "path absent at revision");
            return Ok(None);
        }
        let spec = format!("{revision}:{path}");
        self.git(&["cat-file", "blob", &spec]).map(Some)
    }
}

fn run_git(dir: &Path, args: &[&str]) -> Result<Vec<u8>> {
    debug!(dir = %dir.display(), args = ?args, "running git");
    let output = Command::new("git").arg("-C").arg(dir).args(args).output()?;
    if !output.status.success() {
        return Err(VcsError::Command {
            command: args.join(" "),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output.stdout)
}

fn utf8(command: &str, bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|_| VcsError::NonUtf8(command.to_string()))
}

/// NUL-separated paths as printed with `-z`, which are never quoted.
fn parse_listing(stdout: &str) -> Vec<String> {
    stdout
        .split('\0')
        .filter(|path| !path.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_keeps_order_and_skips_blanks() {
        let paths = parse_listing("b.ipynb\0sub/a b.ipynb\0\0");
        assert_eq!(paths, vec!["b.ipynb", "sub/a b.ipynb"]);
    }

    #[test]
    fn empty_listing() {
        assert!(parse_listing("").is_empty());
    }

    #[test]
    fn non_utf8_is_an_error() {
        let err = utf8("diff", vec![0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, VcsError::NonUtf8(ref c) if c == "diff"));
    }

    #[test]
    fn discover_outside_repository_fails() {
        let dir = tempfile::tempdir().unwrap();
        let inside = Command::new("git")
            .arg("-C")
            .arg(dir.path())
            .args(["rev-parse", "--is-inside-work-tree"])
            .output();
        // Temp dirs nested inside a checkout cannot be used for this check.
        if matches!(&inside, Ok(o) if o.status.success()) {
            return;
        }
        assert!(GitCli::discover_from(dir.path()).is_err());
    }

    #[test]
    fn command_error_mentions_arguments() {
        let err = VcsError::Command {
            command: "cat-file blob HEAD:x".into(),
            status: "exit status: 128".into(),
            stderr: "fatal: path 'x' does not exist".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("git cat-file blob HEAD:x"));
        assert!(msg.contains("fatal"));
    }

    #[test]
    fn non_ascii_paths_are_listed_and_fetched() {
        let dir = tempfile::tempdir().unwrap();
        let git = |args: &[&str]| {
            Command::new("git")
                .arg("-C")
                .arg(dir.path())
                .args(["-c", "user.name=nbdiff", "-c", "user.email=nbdiff@example.com"])
                .args(["-c", "commit.gpgsign=false"])
                .args(args)
                .output()
        };
        if !matches!(git(&["init", "-q"]), Ok(o) if o.status.success()) {
            return;
        }
        let file = dir.path().join("café #1.ipynb");
        for (content, message) in [("v1", "first"), ("v2", "second")] {
            std::fs::write(&file, content).unwrap();
            assert!(git(&["add", "."]).unwrap().status.success());
            assert!(git(&["commit", "-q", "-m", message]).unwrap().status.success());
        }

        let source = GitCli::at(dir.path());
        let paths = source.changed_paths("HEAD~1", "HEAD", "ipynb").unwrap();
        assert_eq!(paths, vec!["café #1.ipynb"]);
        assert_eq!(source.fetch("HEAD~1", &paths[0]).unwrap(), Some(b"v1".to_vec()));
        assert_eq!(source.fetch("HEAD", &paths[0]).unwrap(), Some(b"v2".to_vec()));
        assert_eq!(source.fetch("HEAD", "missing.ipynb").unwrap(), None);
    }

    #[test]
    fn explicit_root() {
        let git = GitCli::at("/repo");
        assert_eq!(git.root(), Path::new("/repo"));
    }
}
