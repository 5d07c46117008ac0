use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Settings for one diff run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Unchanged lines kept on each side of an edit.
    pub context: usize,
    /// Extension (without the dot) of the documents to compare.
    pub extension: String,
    /// Include the KaTeX render toggle in generated pages.
    pub math_toggle: bool,
    /// Open the first generated page when the run finishes.
    pub open_viewer: bool,
    /// Abort on the first document that fails to parse instead of skipping it.
    pub fail_fast: bool,
    /// Prefix of the temporary directory created when `out_dir` is unset.
    pub temp_prefix: String,
    /// Write pages here instead of a fresh temporary directory.
    pub out_dir: Option<PathBuf>,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            context: 2,
            extension: "ipynb".into(),
            math_toggle: true,
            open_viewer: true,
            fail_fast: false,
            temp_prefix: "nbdiff_".into(),
            out_dir: None,
        }
    }
}

impl DiffConfig {
    /// Defaults suited to tests and embedding: nothing is opened.
    pub fn headless() -> Self {
        Self {
            open_viewer: false,
            ..Default::default()
        }
    }
}
