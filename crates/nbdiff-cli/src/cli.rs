use std::path::PathBuf;

use clap::Parser;
use nbdiff_sdk::DiffConfig;

#[derive(Debug, Parser)]
#[command(
    name = "nbdiff",
    about = "Side-by-side HTML diffs of notebooks between two git revisions",
    version
)]
pub struct Cli {
    /// Base revision
    pub rev_a: String,

    /// Target revision
    #[arg(default_value = "HEAD")]
    pub rev_b: String,

    /// Unchanged lines kept around each edit
    #[arg(short = 'C', long, default_value_t = 2)]
    pub context: usize,

    /// Extension of the documents to compare
    #[arg(long = "ext", default_value = "ipynb")]
    pub extension: String,

    /// Write pages to this directory instead of a new temporary one
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Do not open the first page in a browser
    #[arg(long)]
    pub no_open: bool,

    /// Leave out the KaTeX render toggle
    #[arg(long)]
    pub no_math: bool,

    /// Stop at the first notebook that cannot be parsed
    #[arg(long)]
    pub fail_fast: bool,

    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn config(&self) -> DiffConfig {
        DiffConfig {
            context: self.context,
            extension: self.extension.trim_start_matches('.').to_string(),
            math_toggle: !self.no_math,
            open_viewer: !self.no_open,
            fail_fast: self.fail_fast,
            out_dir: self.out_dir.clone(),
            ..DiffConfig::default()
        }
    }
}
