//! In-memory size accounting for the active slot

use std::path::Path;

use crate::error::{LogError, Result};
use crate::slots::file_size;

/// Mirrors the byte length of the active slot without re-stat'ing it
///
/// Seeded from disk once at construction; afterwards only the bytes the
/// writer actually wrote are added.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SizeTracker {
    current: u64,
}

impl SizeTracker {
    /// Create a tracker starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the tracker from the on-disk size of `active`
    pub fn seeded_from(active: &Path) -> Self {
        Self {
            current: file_size(active),
        }
    }

    /// Bytes written to the active slot since the last rollover
    pub fn current(&self) -> u64 {
        self.current
    }

    /// Account for `n` freshly written bytes
    ///
    /// Overflow cannot happen with real files; it is reported as an
    /// invariant violation and leaves the counter untouched.
    pub fn add_written(&mut self, n: u64) -> Result<()> {
        match self.current.checked_add(n) {
            Some(next) => {
                self.current = next;
                Ok(())
            }
            None => {
                debug_assert!(false, "size counter overflow: {} + {}", self.current, n);
                Err(LogError::invariant(format!(
                    "size counter overflow: {} + {}",
                    self.current, n
                )))
            }
        }
    }

    /// Reset to zero after a rollover
    pub fn reset(&mut self) {
        self.current = 0;
    }
}
