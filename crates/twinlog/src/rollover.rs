//! Rollover policy and the retire-and-promote sequence
//!
//! When the active slot grows past the threshold it is finalized: a footer
//! is appended, the handle is closed, the size counter is reset, the old
//! previous slot is deleted and the active slot is renamed over it. The
//! next append then starts a fresh active slot. If the rename fails the
//! active slot keeps growing under a fresh counter and the next rollover
//! tries again.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::{info, instrument, warn};

use crate::error::Result;
use crate::size::SizeTracker;
use crate::slots::{remove_if_exists, SlotPaths};
use crate::stream::StreamManager;

/// Whether a slot of `current` bytes must be rotated under `threshold`
///
/// The comparison is strict: a slot exactly at the threshold is kept.
pub fn should_rollover(current: u64, threshold: u64) -> bool {
    current > threshold
}

/// What to do with the files once the handle is closed
///
/// Only a rotation resets the size counter; a plain close leaves the active
/// slot, and therefore its accounted size, in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeMode {
    /// Write the footer, close, and promote active to previous
    Rotate,
    /// Write the footer and close, leaving the files in place
    CloseOnly,
}

/// Result of a finalize call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalizeOutcome {
    /// Whether the active slot was renamed to the previous slot
    pub promoted: bool,
    /// Whether an existing previous slot was deleted first
    pub discarded_previous: bool,
}

/// Decides when to rotate and performs the file operations
#[derive(Debug, Clone)]
pub struct RolloverEngine {
    threshold: u64,
    marker: String,
    active: PathBuf,
    previous: PathBuf,
}

impl RolloverEngine {
    /// Create an engine for the given slots
    pub fn new(threshold: u64, marker: impl Into<String>, paths: &SlotPaths) -> Self {
        Self {
            threshold,
            marker: marker.into(),
            active: paths.active.clone(),
            previous: paths.previous.clone(),
        }
    }

    /// The configured threshold in bytes
    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Whether the tracked size has passed the threshold
    pub fn should_rollover(&self, size: &SizeTracker) -> bool {
        should_rollover(size.current(), self.threshold)
    }

    /// Close the stream and, for [`FinalizeMode::Rotate`], promote the slots
    ///
    /// An open stream gets the footer before it is closed, in both modes.
    /// Writing the footer, deleting the old previous slot and renaming the
    /// active slot are all best-effort: failures are logged and the slots
    /// are left as they are. Only closing the handle and accounting the
    /// footer on a plain close can fail.
    #[instrument(skip_all, fields(mode = ?mode))]
    pub fn finalize(
        &self,
        stream: &mut StreamManager,
        size: &mut SizeTracker,
        mode: FinalizeMode,
    ) -> Result<FinalizeOutcome> {
        if stream.is_open() {
            match stream.write(self.marker.as_bytes()) {
                // On a plain close the footer stays in the active slot, so it
                // is accounted like any other append.
                Ok(written) if mode == FinalizeMode::CloseOnly => {
                    size.add_written(written as u64)?;
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Failed to write rollover footer"),
            }
        }

        stream.close()?;

        if mode == FinalizeMode::CloseOnly {
            return Ok(FinalizeOutcome {
                promoted: false,
                discarded_previous: false,
            });
        }

        let retired_size = size.current();
        size.reset();

        let discarded_previous = match remove_if_exists(&self.previous) {
            Ok(removed) => removed,
            Err(e) => {
                warn!(path = %self.previous.display(), error = %e, "Failed to remove previous log");
                false
            }
        };

        let promoted = match fs::rename(&self.active, &self.previous) {
            Ok(()) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => {
                warn!(
                    from = %self.active.display(),
                    to = %self.previous.display(),
                    error = %e,
                    "Failed to promote active log"
                );
                false
            }
        };

        if promoted {
            info!(
                path = %self.previous.display(),
                size = retired_size,
                threshold = self.threshold,
                "Rolled over log file"
            );
        }

        Ok(FinalizeOutcome {
            promoted,
            discarded_previous,
        })
    }
}
