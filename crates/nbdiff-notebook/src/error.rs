use thiserror::Error;

/// Errors produced while parsing a notebook document.
#[derive(Debug, Error)]
pub enum NotebookError {
    /// The bytes are not valid JSON, or a field has the wrong shape.
    #[error("invalid notebook JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON is well formed but is not a notebook.
    #[error("malformed notebook: {0}")]
    Malformed(String),

    /// The document predates nbformat 3.
    #[error("unsupported nbformat version {0}; only v3 and later are supported")]
    UnsupportedVersion(u64),
}

/// Result alias for notebook operations.
pub type Result<T> = std::result::Result<T, NotebookError>;
