//! Transient file store for uploads awaiting transcription.
//!
//! Every upload is written to its own uniquely named file in a scratch
//! directory and removed again as soon as the request that created it is done.
//! [`ScratchFile`] is a guard: dropping it deletes the file, so no exit path of
//! the pipeline can leave one behind.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::ScratchConfig;

/// Writes uploads to the scratch directory
#[derive(Debug, Clone)]
pub struct ScratchStore {
    dir: PathBuf,
    prefix: String,
}

impl ScratchStore {
    pub fn new(dir: PathBuf, prefix: impl Into<String>) -> Self {
        Self {
            dir,
            prefix: prefix.into(),
        }
    }

    /// Build from configuration, defaulting to the system temp directory
    pub fn from_config(config: &ScratchConfig) -> Self {
        let dir = config.dir.clone().unwrap_or_else(std::env::temp_dir);
        Self::new(dir, config.prefix.clone())
    }

    /// Persist `bytes` to a fresh scratch file.
    ///
    /// `extension` is used as the file suffix (without the dot). The write
    /// runs on the blocking pool.
    pub async fn store(&self, bytes: Vec<u8>, extension: &str) -> io::Result<ScratchFile> {
        let dir = self.dir.clone();
        let prefix = self.prefix.clone();
        let suffix = if extension.is_empty() {
            String::new()
        } else {
            format!(".{}", extension)
        };

        let temp_path = tokio::task::spawn_blocking(move || -> io::Result<TempPath> {
            let mut file = tempfile::Builder::new()
                .prefix(&prefix)
                .suffix(&suffix)
                .tempfile_in(&dir)?;
            file.write_all(&bytes)?;
            file.flush()?;
            Ok(file.into_temp_path())
        })
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))??;

        let scratch = ScratchFile::new(temp_path);
        debug!(
            "Stored upload in scratch file {} (request {})",
            scratch.path().display(),
            scratch.id()
        );
        Ok(scratch)
    }
}

/// Request-scoped handle to a scratch file. Removes the file on drop.
#[derive(Debug)]
pub struct ScratchFile {
    id: Uuid,
    path: PathBuf,
    temp: Option<TempPath>,
}

impl ScratchFile {
    fn new(temp: TempPath) -> Self {
        Self {
            id: Uuid::new_v4(),
            path: temp.to_path_buf(),
            temp: Some(temp),
        }
    }

    /// Identity of the request owning this file
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_released(&self) -> bool {
        self.temp.is_none()
    }

    /// Delete the file if it still exists.
    ///
    /// Idempotent. Failures are logged and swallowed: the scratch directory is
    /// subject to external reclamation anyway.
    pub fn release(&mut self) {
        let Some(temp) = self.temp.take() else {
            return;
        };

        match temp.close() {
            Ok(()) => debug!("Removed scratch file {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Scratch file {} was already gone", self.path.display())
            }
            Err(e) => warn!(
                "Failed to remove scratch file {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        self.release();
    }
}
