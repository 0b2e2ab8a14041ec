//! # twinlog
//!
//! Size-bounded, append-only log files with a two-generation rollover.
//!
//! A log directory holds two slot files. Appends go to the *active* slot;
//! once it grows past the configured threshold it is retired to the
//! *previous* slot (replacing the older generation) and the next append
//! starts a fresh active slot. Total on-disk size therefore stays around
//! twice the threshold.
//!
//! ## Features
//!
//! - **LogWriter**: thread-safe append facade; all mutation happens under one lock
//! - **SizeTracker**: in-memory size accounting, seeded from disk once
//! - **StreamManager**: lazily opened append handle to the active slot
//! - **RolloverEngine**: strict `size > threshold` policy and the retire-and-promote sequence
//! - **LogReader**: unsynchronized combined read, active slot first
//! - **Export**: atomic regeneration of a single combined file for attachments
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use twinlog::{LogWriter, SlotConfig};
//!
//! # fn main() -> twinlog::Result<()> {
//! let writer = Arc::new(LogWriter::open(
//!     SlotConfig::new("/var/log/myapp").with_max_file_size(256 * 1024),
//! )?);
//!
//! writer.append_line("service started")?;
//! twinlog::twinlog!(writer, "connected to {} peers", 3)?;
//!
//! if let Some(text) = writer.read_all()? {
//!     println!("{text}");
//! }
//! let attachment = writer.export_log()?;
//! # let _ = attachment;
//! # Ok(())
//! # }
//! ```
//!
//! ## Limitations
//!
//! Only in-process writers are serialized; two processes appending to the
//! same directory will interleave and race on rollover. Partial writes are
//! accounted by the bytes actually written, so a stream of partial writes
//! can delay rollover.
//! A rollover whose rename fails is logged and skipped; the active slot
//! keeps growing until a later rollover manages to promote it.

pub mod config;
pub mod error;
pub mod export;
pub mod reader;
pub mod rollover;
pub mod shared;
pub mod size;
pub mod slots;
pub mod stream;
pub mod writer;

// Re-exports
pub use config::{SlotConfig, DEFAULT_MAX_FILE_SIZE, DEFAULT_ROLLOVER_MARKER};
pub use error::{LogError, Result};
pub use export::export_combined;
pub use reader::LogReader;
pub use rollover::{should_rollover, FinalizeMode, FinalizeOutcome, RolloverEngine};
pub use shared::{init_shared, shared};
pub use size::SizeTracker;
pub use slots::{Slot, SlotPaths};
pub use stream::{StreamManager, StreamState};
pub use writer::LogWriter;

/// Append a formatted line tagged with the call site's file and line
///
/// Expands to [`LogWriter::log_at`] and evaluates to its `Result`.
///
/// ```rust,no_run
/// # fn demo(writer: &twinlog::LogWriter) -> twinlog::Result<()> {
/// twinlog::twinlog!(writer, "retrying after {}ms", 250)?;
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! twinlog {
    ($writer:expr, $($arg:tt)+) => {
        $writer.log_at(file!(), line!(), format_args!($($arg)+))
    };
}
