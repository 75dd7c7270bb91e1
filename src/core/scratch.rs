//! Local scratch copy of the changelog document
//!
//! The working copy lives in a temp file for the duration of a run. It is deleted
//! after a successful publish, or kept (and its path reported) when the upload fails
//! so the merged document can be recovered by hand.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub struct ScratchFile {
  file: NamedTempFile,
}

impl ScratchFile {
  /// Create an empty scratch file in `dir`, named after the object key
  pub fn create(dir: &Path, key: &str) -> io::Result<Self> {
    let file_name = key.rsplit('/').next().unwrap_or(key);
    let suffix = format!("-{}", file_name);
    let file = tempfile::Builder::new().prefix("chlog-").suffix(&suffix).tempfile_in(dir)?;
    tracing::debug!(path = %file.path().display(), "created scratch file");
    Ok(Self { file })
  }

  pub fn path(&self) -> &Path {
    self.file.path()
  }

  /// Replace the scratch contents
  pub fn write(&self, bytes: &[u8]) -> io::Result<()> {
    fs::write(self.file.path(), bytes)
  }

  pub fn read(&self) -> io::Result<Vec<u8>> {
    fs::read(self.file.path())
  }

  /// Delete the scratch file
  pub fn remove(self) -> io::Result<()> {
    let path = self.file.path().to_path_buf();
    self.file.close()?;
    tracing::debug!(path = %path.display(), "removed scratch file");
    Ok(())
  }

  /// Keep the scratch file on disk past the end of the run
  pub fn keep(self) -> io::Result<PathBuf> {
    let (_, path) = self.file.keep().map_err(|e| e.error)?;
    Ok(path)
  }
}
