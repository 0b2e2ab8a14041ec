//! The log writer facade
//!
//! [`LogWriter`] is the only type callers append through. Every append runs
//! under one lock: ensure the stream is open, write, account the bytes, and
//! rotate if the active slot passed the threshold.

use std::cell::RefCell;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use parking_lot::ReentrantMutex;
use tracing::{info, instrument, warn};

use crate::config::SlotConfig;
use crate::error::{LogError, Result};
use crate::reader::LogReader;
use crate::rollover::{FinalizeMode, FinalizeOutcome, RolloverEngine};
use crate::size::SizeTracker;
use crate::slots::SlotPaths;
use crate::stream::StreamManager;

/// Mutable state guarded by the writer lock
#[derive(Debug)]
struct WriterState {
    stream: StreamManager,
    size: SizeTracker,
    rollovers: u64,
}

/// Thread-safe, size-bounded, two-slot log writer
///
/// Share it between threads through an `Arc`. Dropping the writer closes
/// the active slot the same way [`LogWriter::close`] does.
pub struct LogWriter {
    config: SlotConfig,
    paths: SlotPaths,
    engine: RolloverEngine,
    // Reentrant so an append issued from inside the critical section (for
    // example by a tracing subscriber that writes into this same log) fails
    // with an error instead of deadlocking.
    state: ReentrantMutex<RefCell<WriterState>>,
}

impl LogWriter {
    /// Open a writer over the configured log directory
    ///
    /// Creates the directory when `create_directory` is set and seeds the
    /// size counter from the active slot on disk. No file handle is opened
    /// until the first append.
    #[instrument(skip_all, fields(directory = %config.directory.display()))]
    pub fn open(config: SlotConfig) -> Result<Self> {
        config.validate()?;

        if config.create_directory {
            fs::create_dir_all(&config.directory).map_err(|e| {
                LogError::io(format!("create {}: {e}", config.directory.display()))
            })?;
        } else if !config.directory.is_dir() {
            return Err(LogError::io(format!(
                "log directory {} does not exist",
                config.directory.display()
            )));
        }

        let paths = config.paths();
        let size = SizeTracker::seeded_from(&paths.active);
        let engine = RolloverEngine::new(
            config.max_file_size,
            config.rollover_marker.clone(),
            &paths,
        );
        let stream = StreamManager::new(&paths.active, config.sync_on_write);

        info!(
            active = %paths.active.display(),
            size = size.current(),
            threshold = config.max_file_size,
            "Opened log writer"
        );

        Ok(Self {
            config,
            paths,
            engine,
            state: ReentrantMutex::new(RefCell::new(WriterState {
                stream,
                size,
                rollovers: 0,
            })),
        })
    }

    /// Append `text` to the active slot
    ///
    /// Fails only if the active slot cannot be opened or written. The text is
    /// written as-is; no newline is added.
    pub fn append(&self, text: &str) -> Result<()> {
        self.with_state(|state| self.append_locked(state, text.as_bytes()))
    }

    /// Append raw bytes, which must be valid UTF-8
    ///
    /// Invalid input is rejected with [`LogError::Encoding`] before anything
    /// is written.
    pub fn append_bytes(&self, bytes: &[u8]) -> Result<()> {
        let text = std::str::from_utf8(bytes)?;
        self.append(text)
    }

    /// Append `text` followed by a newline, in a single write
    pub fn append_line(&self, text: &str) -> Result<()> {
        let mut line = String::with_capacity(text.len() + 1);
        line.push_str(text);
        line.push('\n');
        self.append(&line)
    }

    /// Append preformatted arguments
    pub fn append_fmt(&self, args: fmt::Arguments<'_>) -> Result<()> {
        match args.as_str() {
            Some(text) => self.append(text),
            None => self.append(&args.to_string()),
        }
    }

    /// Append a `file:line: message` line, as produced by [`crate::twinlog!`]
    ///
    /// Debug builds also echo the line through `tracing` at debug level.
    pub fn log_at(&self, file: &str, line: u32, args: fmt::Arguments<'_>) -> Result<()> {
        let text = format!("{file}:{line}: {args}\n");

        #[cfg(debug_assertions)]
        tracing::debug!(target: "twinlog::echo", "{}", text.trim_end());

        self.append(&text)
    }

    /// Rotate the active slot now, regardless of its size
    ///
    /// Returns whether a file was promoted; with no active slot on disk this
    /// is a no-op.
    pub fn rollover_now(&self) -> Result<bool> {
        self.with_state(|state| Ok(self.rotate_locked(state)?.promoted))
    }

    /// Write the footer, then flush and close the active slot without rotating it
    ///
    /// The footer is only written when a handle is open, so repeated calls
    /// are no-ops. A later append reopens the active slot after the footer.
    pub fn close(&self) -> Result<()> {
        self.with_state(|state| {
            self.engine
                .finalize(&mut state.stream, &mut state.size, FinalizeMode::CloseOnly)
                .map(|_| ())
        })
    }

    /// Bytes accounted to the active slot since the last rollover
    ///
    /// The introspection accessors report their default (`0` or `false`)
    /// when called from inside an append on the same thread, where the
    /// writer state is already borrowed.
    pub fn current_size(&self) -> u64 {
        self.with_state(|state| Ok(state.size.current()))
            .unwrap_or_default()
    }

    /// Rollovers completed by this writer instance
    pub fn rollover_count(&self) -> u64 {
        self.with_state(|state| Ok(state.rollovers))
            .unwrap_or_default()
    }

    /// Whether an append handle is currently held
    pub fn is_open(&self) -> bool {
        self.with_state(|state| Ok(state.stream.is_open()))
            .unwrap_or_default()
    }

    /// Configuration this writer was opened with
    pub fn config(&self) -> &SlotConfig {
        &self.config
    }

    /// Resolved slot paths
    pub fn paths(&self) -> &SlotPaths {
        &self.paths
    }

    /// A reader over the same slots
    ///
    /// Reads take no lock and may observe a rollover in progress.
    pub fn reader(&self) -> LogReader {
        LogReader::new(self.paths.clone())
    }

    /// Combined contents of both slots, newest slot first
    pub fn read_all(&self) -> Result<Option<String>> {
        self.reader().read_all()
    }

    /// Regenerate the export file from both slots and return its path
    ///
    /// The file is fully rewritten on every call.
    pub fn export_log(&self) -> Result<PathBuf> {
        self.reader().export_to(&self.paths.export)
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut WriterState) -> Result<T>) -> Result<T> {
        let guard = self.state.lock();
        let mut state = guard
            .try_borrow_mut()
            .map_err(|_| LogError::invariant("log writer re-entered while an append is in progress"))?;
        f(&mut *state)
    }

    fn append_locked(&self, state: &mut WriterState, bytes: &[u8]) -> Result<()> {
        // A threshold lowered since the last run leaves an oversized slot on
        // disk; retire it before appending more.
        if !state.stream.is_open() && self.engine.should_rollover(&state.size) {
            self.rotate_locked(state)?;
        }

        state.stream.ensure_open()?;
        let written = state.stream.write(bytes)?;
        if written < bytes.len() {
            warn!(
                requested = bytes.len(),
                written = written,
                "Partial write to log file"
            );
        }
        state.size.add_written(written as u64)?;

        if self.engine.should_rollover(&state.size) {
            self.rotate_locked(state)?;
        }

        Ok(())
    }

    fn rotate_locked(&self, state: &mut WriterState) -> Result<FinalizeOutcome> {
        let outcome =
            self.engine
                .finalize(&mut state.stream, &mut state.size, FinalizeMode::Rotate)?;
        if outcome.promoted {
            state.rollovers += 1;
        }
        Ok(outcome)
    }
}

impl fmt::Debug for LogWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogWriter")
            .field("active", &self.paths.active)
            .field("previous", &self.paths.previous)
            .field("threshold", &self.config.max_file_size)
            .finish_non_exhaustive()
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "Failed to close log writer");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::file_size;
    use tempfile::TempDir;

    fn open(dir: &TempDir, threshold: u64) -> LogWriter {
        let config = SlotConfig::new(dir.path())
            .with_max_file_size(threshold)
            .with_rollover_marker("#");
        LogWriter::open(config).unwrap()
    }

    #[test]
    fn test_open_does_not_create_slots() {
        let dir = TempDir::new().unwrap();
        let writer = open(&dir, 64);

        assert!(!writer.is_open());
        assert!(!writer.paths().active.exists());
        assert!(!writer.paths().previous.exists());
    }

    #[test]
    fn test_open_creates_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let writer = LogWriter::open(SlotConfig::new(&nested)).unwrap();

        assert!(nested.is_dir());
        writer.append("x").unwrap();
        assert!(writer.paths().active.exists());
    }

    #[test]
    fn test_open_without_directory_creation() {
        let dir = TempDir::new().unwrap();
        let config = SlotConfig::new(dir.path().join("absent")).with_create_directory(false);

        let err = LogWriter::open(config).unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_open_rejects_invalid_config() {
        let dir = TempDir::new().unwrap();
        let config = SlotConfig::new(dir.path()).with_slot_names("same", "same");
        assert!(matches!(LogWriter::open(config), Err(LogError::InvalidConfig(_))));
    }

    #[test]
    fn test_append_tracks_size() {
        let dir = TempDir::new().unwrap();
        let writer = open(&dir, 64);

        writer.append("hello").unwrap();
        writer.append(" world").unwrap();

        assert!(writer.is_open());
        assert_eq!(writer.current_size(), 11);
        assert_eq!(fs::read_to_string(&writer.paths().active).unwrap(), "hello world");
    }

    #[test]
    fn test_seeds_size_from_existing_active_slot() {
        let dir = TempDir::new().unwrap();
        {
            let writer = open(&dir, 64);
            writer.append("0123456789").unwrap();
        }

        let writer = open(&dir, 64);
        assert_eq!(writer.current_size(), 11);
        writer.append("abc").unwrap();
        assert_eq!(writer.current_size(), 14);
        assert_eq!(
            fs::read_to_string(&writer.paths().active).unwrap(),
            "0123456789#abc"
        );
    }

    #[test]
    fn test_rotates_once_past_threshold() {
        let dir = TempDir::new().unwrap();
        let writer = open(&dir, 10);

        writer.append("0123456789").unwrap();
        assert_eq!(writer.rollover_count(), 0);
        assert!(writer.paths().active.exists());

        writer.append("!").unwrap();
        assert_eq!(writer.rollover_count(), 1);
        assert_eq!(writer.current_size(), 0);
        assert!(!writer.paths().active.exists());
        assert_eq!(
            fs::read_to_string(&writer.paths().previous).unwrap(),
            "0123456789!#"
        );
    }

    #[test]
    fn test_reopens_fresh_after_rotation() {
        let dir = TempDir::new().unwrap();
        let writer = open(&dir, 4);

        writer.append("first").unwrap();
        writer.append("next").unwrap();

        assert_eq!(fs::read_to_string(&writer.paths().active).unwrap(), "next");
        assert_eq!(fs::read_to_string(&writer.paths().previous).unwrap(), "first#");
    }

    #[test]
    fn test_lowered_threshold_rotates_before_append() {
        let dir = TempDir::new().unwrap();
        {
            let writer = open(&dir, 1024);
            writer.append("a long line from an older run").unwrap();
        }

        let writer = open(&dir, 8);
        writer.append("new").unwrap();

        assert_eq!(writer.rollover_count(), 1);
        assert_eq!(fs::read_to_string(&writer.paths().active).unwrap(), "new");
        assert_eq!(
            fs::read_to_string(&writer.paths().previous).unwrap(),
            "a long line from an older run#"
        );
    }

    #[test]
    fn test_append_bytes_rejects_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let writer = open(&dir, 64);

        let err = writer.append_bytes(&[0x66, 0x6f, 0xff]).unwrap_err();
        assert!(matches!(err, LogError::Encoding(_)));
        assert_eq!(writer.current_size(), 0);
        assert!(!writer.paths().active.exists());

        writer.append_bytes("ok".as_bytes()).unwrap();
        assert_eq!(writer.current_size(), 2);
    }

    #[test]
    fn test_append_line_and_fmt() {
        let dir = TempDir::new().unwrap();
        let writer = open(&dir, 1024);

        writer.append_line("one").unwrap();
        writer.append_fmt(format_args!("{}-{}\n", 2, "two")).unwrap();

        assert_eq!(
            fs::read_to_string(&writer.paths().active).unwrap(),
            "one\n2-two\n"
        );
    }

    #[test]
    fn test_log_at_prefixes_location() {
        let dir = TempDir::new().unwrap();
        let writer = open(&dir, 1024);

        writer
            .log_at("src/main.rs", 42, format_args!("value={}", 7))
            .unwrap();

        assert_eq!(
            fs::read_to_string(&writer.paths().active).unwrap(),
            "src/main.rs:42: value=7\n"
        );
    }

    #[test]
    fn test_rollover_now() {
        let dir = TempDir::new().unwrap();
        let writer = open(&dir, 1024);

        assert!(!writer.rollover_now().unwrap());

        writer.append("manual").unwrap();
        assert!(writer.rollover_now().unwrap());
        assert_eq!(writer.rollover_count(), 1);
        assert_eq!(fs::read_to_string(&writer.paths().previous).unwrap(), "manual#");
    }

    #[test]
    fn test_close_is_idempotent_and_append_reopens() {
        let dir = TempDir::new().unwrap();
        let writer = open(&dir, 1024);

        writer.append("before").unwrap();
        writer.close().unwrap();
        writer.close().unwrap();
        assert!(!writer.is_open());
        assert_eq!(writer.current_size(), 7);
        assert_eq!(fs::read_to_string(&writer.paths().active).unwrap(), "before#");

        writer.append(" after").unwrap();
        assert_eq!(
            fs::read_to_string(&writer.paths().active).unwrap(),
            "before# after"
        );
        assert!(!writer.paths().previous.exists());
    }

    #[test]
    fn test_size_counter_matches_disk() {
        let dir = TempDir::new().unwrap();
        let writer = open(&dir, 100);

        for i in 0..50 {
            writer.append(&format!("line {i}\n")).unwrap();
            assert_eq!(writer.current_size(), file_size(&writer.paths().active));
        }
    }

    #[test]
    fn test_reentrant_append_is_rejected() {
        let dir = TempDir::new().unwrap();
        let writer = open(&dir, 1024);

        let err = writer
            .with_state(|_| writer.append("inner"))
            .unwrap_err();
        assert!(matches!(err, LogError::Invariant(_)));
    }

    #[test]
    fn test_reentrant_accessors_report_defaults() {
        let dir = TempDir::new().unwrap();
        let writer = open(&dir, 1024);
        writer.append("abc").unwrap();

        let seen = writer
            .with_state(|_| Ok((writer.current_size(), writer.is_open())))
            .unwrap();
        assert_eq!(seen, (0, false));
        assert_eq!(writer.current_size(), 3);
        assert!(writer.is_open());
    }

    #[test]
    fn test_drop_writes_footer() {
        let dir = TempDir::new().unwrap();
        let active = {
            let writer = open(&dir, 1024);
            writer.append("x").unwrap();
            writer.paths().active.clone()
        };

        assert_eq!(fs::read_to_string(&active).unwrap(), "x#");
    }

    #[test]
    fn test_blocked_previous_slot_does_not_fail_append() {
        let dir = TempDir::new().unwrap();
        let writer = open(&dir, 4);
        let previous = writer.paths().previous.clone();
        fs::create_dir(&previous).unwrap();
        fs::write(previous.join("occupant"), b"x").unwrap();

        writer.append("hello").unwrap();
        assert_eq!(writer.current_size(), 0);
        assert_eq!(writer.rollover_count(), 0);
        assert_eq!(fs::read_to_string(&writer.paths().active).unwrap(), "hello#");

        // Retrying is not needed, and the next append lands exactly once.
        writer.append("world").unwrap();
        assert_eq!(
            fs::read_to_string(&writer.paths().active).unwrap(),
            "hello#world#"
        );

        // Once the obstruction is gone the next rollover promotes normally.
        fs::remove_dir_all(&previous).unwrap();
        writer.append("again").unwrap();
        assert_eq!(writer.rollover_count(), 1);
        assert_eq!(
            fs::read_to_string(&previous).unwrap(),
            "hello#world#again#"
        );
        assert!(!writer.paths().active.exists());
    }
}
