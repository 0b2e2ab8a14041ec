//! Export of the combined log to a single file
//!
//! The export is a derived artifact: it is regenerated in full from both
//! slots every time it is requested and never read back by the writer.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use crate::error::{LogError, Result};
use crate::reader::LogReader;

/// Write the combined contents of both slots to `target`
///
/// The file is replaced atomically: content goes to a temporary file in the
/// same directory which is then renamed over `target`. When both slots are
/// empty the export is written empty, so the returned path always exists.
#[instrument(skip_all, fields(path = %target.display()))]
pub fn export_combined(reader: &LogReader, target: &Path) -> Result<PathBuf> {
    let content = reader.read_all()?.unwrap_or_default();

    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(content.as_bytes())?;
    temp.as_file().sync_all()?;
    temp.persist(target)
        .map_err(|e| LogError::io(format!("persist {}: {}", target.display(), e.error)))?;

    debug!(bytes = content.len(), "Exported log");
    Ok(target.to_path_buf())
}
