//! Crash-safe PKGBUILD replacement

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::updater::error::WriteError;

/// Replace `path` with `content` via a temporary file in the same directory
///
/// The original file's permissions are carried over; readers see either the
/// old or the new content, never a truncated file.
pub async fn write_atomic(path: &Path, content: String) -> Result<(), WriteError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_atomic_blocking(&path, content.as_bytes()))
        .await
        .map_err(|e| WriteError::Task(e.to_string()))?
}

pub fn write_atomic_blocking(path: &Path, content: &[u8]) -> Result<(), WriteError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let write_err = |source| WriteError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = NamedTempFile::new_in(&dir).map_err(|source| WriteError::TempFile {
        dir: dir.clone(),
        source,
    })?;
    file.write_all(content).map_err(write_err)?;
    file.as_file().sync_all().map_err(write_err)?;

    if let Ok(metadata) = std::fs::metadata(path) {
        file.as_file()
            .set_permissions(metadata.permissions())
            .map_err(write_err)?;
    }

    file.persist(path).map_err(|e| WriteError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}
