//! Combined reads over both slots

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::Result;
use crate::export::export_combined;
use crate::slots::{file_size, read_if_exists, Slot, SlotPaths};

/// Reconstructs the log by reading both slots
///
/// Readers take no lock. A read racing a rollover may see the active slot
/// already moved, or the same bytes twice; the result is a best-effort
/// snapshot.
#[derive(Debug, Clone)]
pub struct LogReader {
    paths: SlotPaths,
}

impl LogReader {
    /// Create a reader over the given slots
    pub fn new(paths: SlotPaths) -> Self {
        Self { paths }
    }

    /// Slot paths this reader uses
    pub fn paths(&self) -> &SlotPaths {
        &self.paths
    }

    /// Raw bytes of one slot, or `None` if it does not exist
    pub fn read_slot(&self, slot: Slot) -> Result<Option<Vec<u8>>> {
        read_if_exists(self.paths.slot(slot))
    }

    /// Full log text, active slot first, then the previous slot
    ///
    /// The order is most-recent-generation first, not chronological.
    /// Returns `None` when neither slot holds any bytes. Invalid UTF-8 is
    /// replaced rather than rejected.
    pub fn read_all(&self) -> Result<Option<String>> {
        let current = self.read_slot(Slot::Active)?;
        let previous = self.read_slot(Slot::Previous)?;

        let mut combined = String::new();
        for (slot, bytes) in [(Slot::Active, current), (Slot::Previous, previous)] {
            if let Some(bytes) = bytes {
                combined.push_str(&decode(slot, bytes));
            }
        }

        if combined.is_empty() {
            Ok(None)
        } else {
            Ok(Some(combined))
        }
    }

    /// Write the combined log to `path`, replacing any existing file
    pub fn export_to(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        export_combined(self, path.as_ref())
    }

    /// Total on-disk size of both slots
    pub fn total_size(&self) -> u64 {
        file_size(&self.paths.active) + file_size(&self.paths.previous)
    }
}

fn decode(slot: Slot, bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!(slot = ?slot, error = %e.utf8_error(), "Log slot is not valid UTF-8");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    }
}
