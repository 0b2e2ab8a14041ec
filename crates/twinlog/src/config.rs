//! Configuration types for the log slots

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LogError, Result};
use crate::slots::SlotPaths;

/// Default rollover threshold (256 KiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 256 * 1024;

/// Footer appended to the active slot when its handle is finalized
pub const DEFAULT_ROLLOVER_MARKER: &str = "Rolling over log file...\n";

/// Configuration for a two-slot log directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotConfig {
    /// Directory holding the slot files
    pub directory: PathBuf,
    /// Size of the active slot that triggers a rollover once exceeded
    pub max_file_size: u64,
    /// File name of the slot receiving writes
    pub active_name: String,
    /// File name of the retired slot
    pub previous_name: String,
    /// File name of the regenerated export artifact
    pub export_name: String,
    /// Footer written to the active slot on rollover and on close
    pub rollover_marker: String,
    /// Whether to sync data to disk after every append
    pub sync_on_write: bool,
    /// Create the directory on open if it does not exist
    pub create_directory: bool,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./logs"),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            active_name: "twinlog.0.log".to_string(),
            previous_name: "twinlog.1.log".to_string(),
            export_name: "twinlog.log".to_string(),
            rollover_marker: DEFAULT_ROLLOVER_MARKER.to_string(),
            sync_on_write: false,
            create_directory: true,
        }
    }
}

impl SlotConfig {
    /// Create a config rooted at `directory` with default settings
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Default::default()
        }
    }

    /// Set the rollover threshold
    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    /// Set the slot file names
    pub fn with_slot_names(
        mut self,
        active: impl Into<String>,
        previous: impl Into<String>,
    ) -> Self {
        self.active_name = active.into();
        self.previous_name = previous.into();
        self
    }

    /// Set the export file name
    pub fn with_export_name(mut self, name: impl Into<String>) -> Self {
        self.export_name = name.into();
        self
    }

    /// Set the rollover footer
    pub fn with_rollover_marker(mut self, marker: impl Into<String>) -> Self {
        self.rollover_marker = marker.into();
        self
    }

    /// Enable or disable syncing after each append
    pub fn with_sync_on_write(mut self, enabled: bool) -> Self {
        self.sync_on_write = enabled;
        self
    }

    /// Enable or disable directory creation on open
    pub fn with_create_directory(mut self, enabled: bool) -> Self {
        self.create_directory = enabled;
        self
    }

    /// Check that the slot names are usable and distinct
    pub fn validate(&self) -> Result<()> {
        let names = [
            ("active", &self.active_name),
            ("previous", &self.previous_name),
            ("export", &self.export_name),
        ];

        for (label, name) in names {
            if name.is_empty() {
                return Err(LogError::invalid_config(format!("{label} slot name is empty")));
            }
            if name.contains(['/', '\\']) || name == "." || name == ".." {
                return Err(LogError::invalid_config(format!(
                    "{label} slot name `{name}` is not a plain file name"
                )));
            }
        }

        if self.active_name == self.previous_name
            || self.active_name == self.export_name
            || self.previous_name == self.export_name
        {
            return Err(LogError::invalid_config(
                "active, previous and export names must differ",
            ));
        }

        Ok(())
    }

    /// Resolve the slot file paths inside the directory
    pub fn paths(&self) -> SlotPaths {
        SlotPaths::new(
            &self.directory,
            &self.active_name,
            &self.previous_name,
            &self.export_name,
        )
    }

    /// The configured log directory
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}
