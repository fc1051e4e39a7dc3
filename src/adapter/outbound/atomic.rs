//! Crash-safe file replacement.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::PersistenceError;

/// Replace `path` with `contents` atomically.
///
/// Writes a sibling temp file, fsyncs it, then renames it over the target,
/// so readers see either the previous file or the new one in full. On Unix
/// the parent directory is fsynced after the rename so the new entry
/// survives power loss. Creates the parent directory if it doesn't exist.
/// The temp file is removed on failure.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), PersistenceError> {
    let fail = |source: std::io::Error| PersistenceError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(fail)?;
    }

    let temp_path = temp_path_for(path);
    let cleanup_and_err = |e| {
        let _ = fs::remove_file(&temp_path);
        fail(e)
    };

    let mut file = fs::File::create(&temp_path).map_err(fail)?;
    file.write_all(contents).map_err(cleanup_and_err)?;
    file.sync_all().map_err(cleanup_and_err)?;
    drop(file);

    fs::rename(&temp_path, path).map_err(cleanup_and_err)?;
    sync_parent(path).map_err(fail)
}

#[cfg(unix)]
fn sync_parent(path: &Path) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::File::open(parent)?.sync_all()
}

#[cfg(not(unix))]
fn sync_parent(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// `seen_jobs.json` -> `seen_jobs.json.tmp`, `.env` -> `.env.tmp`.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
