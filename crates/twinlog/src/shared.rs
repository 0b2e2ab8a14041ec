//! Process-wide writer handle
//!
//! Applications that want one log for the whole process install it here
//! once, from their composition root. Nothing is created implicitly.

use std::sync::OnceLock;

use crate::error::{LogError, Result};
use crate::writer::LogWriter;

static SHARED: OnceLock<LogWriter> = OnceLock::new();

/// Install `writer` as the process-wide log
///
/// Fails with [`LogError::AlreadyInitialized`] on a second call; the
/// rejected writer is closed. The installed writer is never dropped, but
/// every append reaches the OS before returning, so nothing is lost at exit.
pub fn init_shared(writer: LogWriter) -> Result<&'static LogWriter> {
    SHARED
        .set(writer)
        .map_err(|_| LogError::AlreadyInitialized)?;
    SHARED
        .get()
        .ok_or_else(|| LogError::invariant("shared log writer missing after init"))
}

/// The process-wide log, if one was installed
pub fn shared() -> Option<&'static LogWriter> {
    SHARED.get()
}
