//! Slot identity and filesystem helpers
//!
//! A log directory holds two slot files, `active` and `previous`, plus an
//! optional export artifact. Slots are identified purely by file name.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// One of the two files that together hold the log history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// The file currently receiving appends
    Active,
    /// The retired generation
    Previous,
}

/// Resolved paths of the slot files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotPaths {
    /// Path of the active slot
    pub active: PathBuf,
    /// Path of the previous slot
    pub previous: PathBuf,
    /// Path of the export artifact
    pub export: PathBuf,
}

impl SlotPaths {
    /// Join the slot names onto `directory`
    pub fn new(directory: &Path, active: &str, previous: &str, export: &str) -> Self {
        Self {
            active: directory.join(active),
            previous: directory.join(previous),
            export: directory.join(export),
        }
    }

    /// Path of the given slot
    pub fn slot(&self, slot: Slot) -> &Path {
        match slot {
            Slot::Active => &self.active,
            Slot::Previous => &self.previous,
        }
    }

    /// Directory containing the slots
    pub fn directory(&self) -> Option<&Path> {
        self.active.parent()
    }
}

/// Size of the file at `path`, or 0 if it does not exist or cannot be stat'ed
pub fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|meta| meta.len()).unwrap_or(0)
}

/// Remove the file at `path`, treating an absent file as success
///
/// Returns whether a file was actually removed.
pub fn remove_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err.into()),
    }
}

/// Read the whole file at `path`, or `None` if it does not exist
pub fn read_if_exists(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}
