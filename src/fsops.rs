//! Filesystem primitives: recursive copy and recursive delete.
//!
//! Two traversal orders, deliberately explicit: copying walks parent-first so
//! directories exist before their contents, deletion walks children-first so
//! directories are empty by the time they are removed.

use std::path::Path;

use crate::error::{ProvisionError, Result};

/// Recursively copy `src` into `dst`, parent-first.
///
/// Directories are recreated as needed; files are copied byte-for-byte. A
/// pre-existing destination *file* is renamed to `<name>.bak` before the copy
/// proceeds, so repeated runs are last-write-wins with the previous version
/// recoverable. Pre-existing destination files never get deleted outright.
///
/// # Errors
///
/// Any single failed copy, mkdir, or rename is fatal ([`ProvisionError::Io`]);
/// there is no best-effort partial copy.
pub fn copy_recursive(src: &Path, dst: &Path) -> Result<()> {
    if src.is_dir() {
        std::fs::create_dir_all(dst)
            .map_err(|e| ProvisionError::io("creating directory", dst, e))?;
        let entries = std::fs::read_dir(src)
            .map_err(|e| ProvisionError::io("reading directory", src, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| ProvisionError::io("reading directory", src, e))?;
            copy_recursive(&entry.path(), &dst.join(entry.file_name()))?;
        }
        return Ok(());
    }

    if let Some(parent) = dst.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ProvisionError::io("creating directory", parent, e))?;
    }
    if dst.is_file() {
        backup_file(dst)?;
    }
    std::fs::copy(src, dst).map_err(|e| ProvisionError::io("copying to", dst, e))?;
    Ok(())
}

/// Rename `path` to `<path>.bak`, replacing any previous backup.
fn backup_file(path: &Path) -> Result<()> {
    let name = path.file_name().map_or_else(
        || std::ffi::OsString::from(".bak"),
        |n| {
            let mut s = n.to_os_string();
            s.push(".bak");
            s
        },
    );
    let backup = path.with_file_name(name);
    std::fs::rename(path, &backup)
        .map_err(|e| ProvisionError::io("backing up", path, e))?;
    Ok(())
}

/// Recursively delete `path`, children-first.
///
/// Symlinks are removed as entries, never followed. A missing `path` is
/// success.
///
/// # Errors
///
/// Returned raw so callers can decide whether deletion failure is fatal
/// (extraction) or advisory (cleanup sweeps).
pub fn remove_recursive(path: &Path) -> std::io::Result<()> {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };

    if meta.is_dir() {
        for entry in std::fs::read_dir(path)? {
            remove_recursive(&entry?.path())?;
        }
        std::fs::remove_dir(path)
    } else {
        std::fs::remove_file(path)
    }
}
