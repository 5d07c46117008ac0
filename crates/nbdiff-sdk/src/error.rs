use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("revision error: {0}")]
    Vcs(#[from] nbdiff_vcs::VcsError),

    #[error("cannot parse {path}: {source}")]
    Notebook {
        path: String,
        #[source]
        source: nbdiff_notebook::NotebookError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot build a file URL for {}", .0.display())]
    FileUrl(std::path::PathBuf),
}

pub type SdkResult<T> = Result<T, SdkError>;
