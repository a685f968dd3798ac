/// Atomic Output Writer
///
/// The output field is written to a temp file next to the target and then
/// renamed over it, so a reader sees either the old content or the whole
/// new field, never a partial one.
///
/// The temp file lives in the target's directory because a rename across
/// filesystems is not atomic.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

/// Replace the content of `path` with `bytes` atomically
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    debug!(path = %path.display(), bytes = bytes.len(), "Output committed");
    Ok(())
}
