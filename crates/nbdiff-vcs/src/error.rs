/// Errors from revision access.
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    /// The `git` executable could not be started.
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    /// A git command exited unsuccessfully.
    #[error("`git {command}` failed ({status}): {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },

    /// A path listing was not valid UTF-8.
    #[error("non-UTF-8 output from `git {0}`")]
    NonUtf8(String),

    /// The revision is not known to the source.
    #[error("unknown revision: {0}")]
    UnknownRevision(String),
}

pub type Result<T> = std::result::Result<T, VcsError>;
