//! Atomic I/O operations with file locking

use std::fs::{self, OpenOptions};
use std::io::Write;

use fs2::FileExt;

use crate::checksum::{content_checksum, file_checksum};
use crate::{Error, NormalizedPath, Result};

/// Write content atomically to a file with locking.
///
/// Writes to a temporary sibling, holds an exclusive advisory lock while
/// flushing, then renames over the destination.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;
    temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;

    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;

    if let Err(e) = fs::rename(&temp_path, &native_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::io(&native_path, e));
    }

    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Write text content to a file atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

/// Write `content` only when the file is missing or differs.
///
/// Returns `true` when the file was written.
pub fn write_if_changed(path: &NormalizedPath, content: &str) -> Result<bool> {
    if path.is_file() {
        let current = file_checksum(&path.to_native()).map_err(|e| Error::io(path.to_native(), e))?;
        if current == content_checksum(content) {
            return Ok(false);
        }
    }
    write_text(path, content)?;
    Ok(true)
}

/// List every regular file beneath `dir`, as sorted forward-slash paths
/// relative to `dir`. A missing directory yields an empty list.
pub fn list_files(dir: &NormalizedPath) -> Result<Vec<String>> {
    let mut files = Vec::new();
    if dir.is_dir() {
        collect_files(dir, dir, &mut files)?;
    }
    files.sort();
    Ok(files)
}

fn collect_files(root: &NormalizedPath, dir: &NormalizedPath, out: &mut Vec<String>) -> Result<()> {
    let native = dir.to_native();
    let entries = fs::read_dir(&native).map_err(|e| Error::io(&native, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(&native, e))?;
        let path = NormalizedPath::new(entry.path());
        let file_type = entry.file_type().map_err(|e| Error::io(entry.path(), e))?;
        if file_type.is_dir() {
            collect_files(root, &path, out)?;
        } else if file_type.is_file() {
            out.push(path.relative_to(root)?);
        }
    }
    Ok(())
}

/// List the immediate subdirectory names of `dir`, sorted.
pub fn list_dirs(dir: &NormalizedPath) -> Result<Vec<String>> {
    let mut dirs = Vec::new();
    if !dir.is_dir() {
        return Ok(dirs);
    }
    let native = dir.to_native();
    for entry in fs::read_dir(&native).map_err(|e| Error::io(&native, e))? {
        let entry = entry.map_err(|e| Error::io(&native, e))?;
        if entry.path().is_dir() {
            dirs.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Remove a file, then every directory above it that became empty, stopping at `stop_at`.
pub fn remove_file_pruning(path: &NormalizedPath, stop_at: &NormalizedPath) -> Result<()> {
    let native = path.to_native();
    fs::remove_file(&native).map_err(|e| Error::io(&native, e))?;

    let mut current = path.parent();
    while let Some(dir) = current {
        if dir == *stop_at || !dir.as_str().starts_with(stop_at.as_str()) {
            break;
        }
        let is_empty = fs::read_dir(dir.to_native())
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false);
        if !is_empty {
            break;
        }
        fs::remove_dir(dir.to_native()).map_err(|e| Error::io(dir.to_native(), e))?;
        tracing::debug!(dir = %dir, "Removed empty directory");
        current = dir.parent();
    }
    Ok(())
}
