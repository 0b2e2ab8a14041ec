//! `MakeWriter` adapter over a [`LogWriter`]

use std::io::{self, Write};
use std::sync::Arc;

use tracing_subscriber::fmt::MakeWriter;
use twinlog::LogWriter;

/// Hands each formatted tracing event to a shared [`LogWriter`]
#[derive(Debug, Clone)]
pub struct SlotMakeWriter {
    log: Arc<LogWriter>,
}

impl SlotMakeWriter {
    /// Create a make-writer appending to `log`
    pub fn new(log: Arc<LogWriter>) -> Self {
        Self { log }
    }

    /// The log events are appended to
    pub fn log(&self) -> &Arc<LogWriter> {
        &self.log
    }
}

/// Writer instance for a single event
#[derive(Debug)]
pub struct SlotEventWriter {
    log: Arc<LogWriter>,
}

impl Write for SlotEventWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.log.append_bytes(buf).map_err(io::Error::other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for SlotMakeWriter {
    type Writer = SlotEventWriter;

    fn make_writer(&'a self) -> Self::Writer {
        SlotEventWriter {
            log: Arc::clone(&self.log),
        }
    }
}
