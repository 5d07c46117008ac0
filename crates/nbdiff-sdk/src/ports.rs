//! Side-effect ports of a diff run.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use url::Url;

use crate::config::DiffConfig;
use crate::error::{SdkError, SdkResult};

/// Destination for generated pages.
///
/// Each file name is written at most once per run.
pub trait ArtifactSink {
    /// Persist `html` under `file_name` and return where it ended up.
    fn write(&mut self, file_name: &str, html: &str) -> SdkResult<PathBuf>;
}

/// Opens a generated page for the user.
pub trait Viewer {
    fn open(&mut self, path: &Path) -> SdkResult<()>;
}

/// The sink a configuration asks for: its `out_dir`, or a fresh temp dir.
pub fn sink_for(config: &DiffConfig) -> Box<dyn ArtifactSink> {
    match &config.out_dir {
        Some(dir) => Box::new(DirSink::new(dir)),
        None => Box::new(TempDirSink::new(&config.temp_prefix)),
    }
}

/// Writes into a temporary directory that outlives the process.
///
/// The directory is created on the first write, so a run that produces no
/// pages leaves nothing behind.
#[derive(Debug)]
pub struct TempDirSink {
    prefix: String,
    dir: Option<PathBuf>,
}

impl TempDirSink {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            dir: None,
        }
    }

    /// The directory in use, once something has been written.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    fn ensure_dir(&mut self) -> SdkResult<PathBuf> {
        if let Some(dir) = &self.dir {
            return Ok(dir.clone());
        }
        let dir = tempfile::Builder::new()
            .prefix(&self.prefix)
            .tempdir()?
            .keep();
        info!(dir = %dir.display(), "created output directory");
        self.dir = Some(dir.clone());
        Ok(dir)
    }
}

impl ArtifactSink for TempDirSink {
    fn write(&mut self, file_name: &str, html: &str) -> SdkResult<PathBuf> {
        let path = self.ensure_dir()?.join(file_name);
        fs::write(&path, html)?;
        debug!(path = %path.display(), "wrote page");
        Ok(path)
    }
}

/// Writes into a caller-chosen directory, creating it if needed.
#[derive(Clone, Debug)]
pub struct DirSink {
    dir: PathBuf,
}

impl DirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ArtifactSink for DirSink {
    fn write(&mut self, file_name: &str, html: &str) -> SdkResult<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        fs::write(&path, html)?;
        debug!(path = %path.display(), "wrote page");
        Ok(path)
    }
}

/// Keeps pages in memory, in write order.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    pub pages: Vec<(String, String)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, file_name: &str) -> Option<&str> {
        self.pages
            .iter()
            .find(|(name, _)| name == file_name)
            .map(|(_, html)| html.as_str())
    }

    pub fn file_names(&self) -> Vec<&str> {
        self.pages.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl ArtifactSink for MemorySink {
    fn write(&mut self, file_name: &str, html: &str) -> SdkResult<PathBuf> {
        self.pages.push((file_name.to_string(), html.to_string()));
        Ok(PathBuf::from(file_name))
    }
}

/// Opens pages in the system web browser.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserViewer;

impl Viewer for BrowserViewer {
    fn open(&mut self, path: &Path) -> SdkResult<()> {
        let url = file_url(path)?;
        debug!(%url, "opening browser");
        webbrowser::open(url.as_str())?;
        Ok(())
    }
}

/// Percent-encoded `file://` URL of an existing file.
pub fn file_url(path: &Path) -> SdkResult<Url> {
    let absolute = fs::canonicalize(path)?;
    Url::from_file_path(&absolute).map_err(|()| SdkError::FileUrl(absolute))
}

/// Never opens anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopViewer;

impl Viewer for NoopViewer {
    fn open(&mut self, _path: &Path) -> SdkResult<()> {
        Ok(())
    }
}

/// Remembers every path it was asked to open.
#[derive(Clone, Debug, Default)]
pub struct RecordingViewer {
    pub opened: Vec<PathBuf>,
}

impl Viewer for RecordingViewer {
    fn open(&mut self, path: &Path) -> SdkResult<()> {
        self.opened.push(path.to_path_buf());
        Ok(())
    }
}
