//! Persistence of the latest research output
//!
//! Every run overwrites the context snippet at a well-known path so other
//! processes in the same session can read it without re-running research.

#![deny(unsafe_code, unused_imports, unused_variables)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable that relocates the output directory
pub const OUTPUT_DIR_ENV: &str = "LAST30DAYS_OUTPUT_DIR";

const CONTEXT_FILE: &str = "last30days.context.md";
const REPORT_FILE: &str = "report.json";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not determine a data directory for last30days output")]
    NoDataDir,
}

pub type Result<T> = std::result::Result<T, PersistError>;

/// Output directory holding the latest context snippet and report dump
#[derive(Debug, Clone)]
pub struct ContextStore {
    dir: PathBuf,
}

impl ContextStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `$LAST30DAYS_OUTPUT_DIR`, else `<data dir>/last30days/out`
    pub fn default_location() -> Result<Self> {
        if let Some(dir) = std::env::var_os(OUTPUT_DIR_ENV).filter(|d| !d.is_empty()) {
            return Ok(Self::new(dir));
        }
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or(PersistError::NoDataDir)?;
        Ok(Self::new(base.join("last30days").join("out")))
    }

    pub fn context_path(&self) -> PathBuf {
        self.dir.join(CONTEXT_FILE)
    }

    pub fn report_path(&self) -> PathBuf {
        self.dir.join(REPORT_FILE)
    }

    /// Atomically replace the context snippet
    pub fn save_context(&self, snippet: &str) -> Result<PathBuf> {
        let path = self.context_path();
        self.write(&path, snippet)?;
        info!(path = %path.display(), bytes = snippet.len(), "Context snippet saved");
        Ok(path)
    }

    /// Atomically replace the full JSON dump of the last report
    pub fn save_report_json(&self, json: &str) -> Result<PathBuf> {
        let path = self.report_path();
        self.write(&path, json)?;
        debug!(path = %path.display(), "Report dump saved");
        Ok(path)
    }

    /// Read the latest context snippet, if any run has saved one
    pub fn read_context(&self) -> Result<Option<String>> {
        let path = self.context_path();
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistError::Io { path, source }),
        }
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|source| PersistError::Io {
            path: self.dir.clone(),
            source,
        })?;
        write_atomic(path, content).map_err(|source| PersistError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Path of the latest context snippet in the default location
pub fn context_path() -> Result<PathBuf> {
    Ok(ContextStore::default_location()?.context_path())
}

/// Latest context snippet from the default location
pub fn read_last_context() -> Result<Option<String>> {
    ContextStore::default_location()?.read_context()
}

/// Write to a sibling temp file, then rename over the destination.
///
/// Readers see either the previous file or the complete new one. On Windows
/// `rename` refuses to overwrite, so the old file is removed first and the
/// swap is not atomic there.
fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let tmp_path = path.with_file_name(format!(".{}.{}.tmp", file_name, std::process::id()));
    fs::write(&tmp_path, content)?;

    #[cfg(windows)]
    {
        if path.exists() {
            if let Err(err) = fs::remove_file(path) {
                let _ = fs::remove_file(&tmp_path);
                return Err(err);
            }
        }
    }

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }
    Ok(())
}
