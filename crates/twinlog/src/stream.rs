//! Append handle lifecycle for the active slot

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{LogError, Result};

/// State of the write handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// No handle is held
    Closed,
    /// An append-mode handle to the active slot is held
    Open,
}

/// Owns at most one append-mode handle to the active slot
///
/// Opens lazily and closes on rollover or shutdown. An open failure leaves
/// the manager `Closed` and hands the error back to the caller.
#[derive(Debug)]
pub struct StreamManager {
    path: PathBuf,
    handle: Option<File>,
    sync_on_write: bool,
}

impl StreamManager {
    /// Create a closed manager for the file at `path`
    pub fn new(path: impl Into<PathBuf>, sync_on_write: bool) -> Self {
        Self {
            path: path.into(),
            handle: None,
            sync_on_write,
        }
    }

    /// Path of the file this manager appends to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current handle state
    pub fn state(&self) -> StreamState {
        if self.handle.is_some() {
            StreamState::Open
        } else {
            StreamState::Closed
        }
    }

    /// Whether a handle is currently held
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Return the open handle, opening the file in append mode if needed
    pub fn ensure_open(&mut self) -> Result<&mut File> {
        if self.handle.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .map_err(|e| LogError::io(format!("open {}: {e}", self.path.display())))?;
            debug!(path = %self.path.display(), "Opened log stream");
            self.handle = Some(file);
        }

        self.handle
            .as_mut()
            .ok_or_else(|| LogError::invariant("stream handle missing after open"))
    }

    /// Append `bytes` with a single write call
    ///
    /// Returns the number of bytes the OS accepted, which may be fewer than
    /// `bytes.len()`. Partial writes are not retried. With `sync_on_write`
    /// the data is synced afterwards; a failed sync is logged and does not
    /// turn the write into an error, since the bytes are already in the file.
    pub fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        let sync = self.sync_on_write;
        let file = self
            .handle
            .as_mut()
            .ok_or_else(|| LogError::invariant("write on a closed log stream"))?;

        let written = file
            .write(bytes)
            .map_err(|e| LogError::io(format!("write {}: {e}", self.path.display())))?;

        if sync {
            if let Err(e) = file.sync_data() {
                warn!(path = %self.path.display(), error = %e, "Failed to sync log file");
            }
        }

        Ok(written)
    }

    /// Flush and release the handle; closing a closed stream is a no-op
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut file) = self.handle.take() {
            file.flush()?;
            if self.sync_on_write {
                if let Err(e) = file.sync_all() {
                    warn!(path = %self.path.display(), error = %e, "Failed to sync log file");
                }
            }
            debug!(path = %self.path.display(), "Closed log stream");
        }
        Ok(())
    }
}
