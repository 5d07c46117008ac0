//! High-level API for nbdiff.
//!
//! Wires the revision source, notebook parser, differencers, and renderer
//! into one run: enumerate changed notebooks, diff them cell by cell, write
//! one HTML page per changed notebook, and open the first page.
//!
//! Side effects go through two ports so runs can be tested without a
//! filesystem or a browser:
//!
//! - [`ArtifactSink`] -- Where pages are written ([`TempDirSink`], [`DirSink`], [`MemorySink`])
//! - [`Viewer`] -- What opens the first page ([`BrowserViewer`], [`NoopViewer`], [`RecordingViewer`])

pub mod config;
pub mod driver;
pub mod error;
pub mod ports;

pub use config::DiffConfig;
pub use driver::{diff_notebook, DocumentFailure, NbDiff, RunOutcome, RunReport};
pub use error::{SdkError, SdkResult};
pub use ports::{
    file_url, sink_for, ArtifactSink, BrowserViewer, DirSink, MemorySink, NoopViewer,
    RecordingViewer, TempDirSink, Viewer,
};

// Re-export key types
pub use nbdiff_notebook::{Cell, CellKind, Output};
pub use nbdiff_render::{Page, RenderedSection};
pub use nbdiff_vcs::{GitCli, InMemoryRevisions, RevisionSource};
