//! Host filesystem helpers shared by the backup store, the reconciler and the
//! substitution pass.
//!
//! Everything here works on real paths. Copies preserve permission bits and
//! file-vs-directory kind; writes go through a temporary sibling file that is
//! renamed over the destination, so a failed write never leaves a truncated
//! file behind.

use crate::error::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use walkdir::WalkDir;

/// Whether a path is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Directory,
}

/// Kind of the entry at `path`, or `None` if nothing is there.
pub fn path_kind(path: &Path) -> Option<PathKind> {
    fs::metadata(path).ok().map(|meta| {
        if meta.is_dir() {
            PathKind::Directory
        } else {
            PathKind::File
        }
    })
}

/// Copy `src` to `dst`, recursing into directories.
pub fn copy_path(src: &Path, dst: &Path) -> Result<PathKind> {
    match path_kind(src) {
        Some(PathKind::Directory) => {
            copy_tree(src, dst)?;
            Ok(PathKind::Directory)
        }
        Some(PathKind::File) => {
            copy_file(src, dst)?;
            Ok(PathKind::File)
        }
        None => Err(Error::not_found("Source", src)),
    }
}

/// Copy a single file. `fs::copy` carries the permission bits over.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst).map_err(|e| Error::Filesystem {
        message: format!(
            "Failed to copy '{}' to '{}': {}",
            src.display(),
            dst.display(),
            e
        ),
    })?;
    Ok(())
}

/// Recursively copy directory `src` into a new directory `dst`.
///
/// Directory permissions are applied after their contents are copied so that
/// read-only directories can still be populated.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    let mut dir_permissions = Vec::new();

    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry?;
        let relative = entry.path().strip_prefix(src).map_err(|e| Error::Filesystem {
            message: format!("Failed to relativize '{}': {}", entry.path().display(), e),
        })?;
        let target = dst.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|e| Error::Filesystem {
                message: format!("Failed to create directory '{}': {}", target.display(), e),
            })?;
            dir_permissions.push((target, entry.metadata()?.permissions()));
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            copy_file(entry.path(), &target)?;
        }
    }

    // Deepest directories first, so parents stay writable while children are fixed up.
    for (dir, permissions) in dir_permissions.into_iter().rev() {
        fs::set_permissions(&dir, permissions).map_err(|e| Error::Filesystem {
            message: format!("Failed to set permissions on '{}': {}", dir.display(), e),
        })?;
    }

    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    let target = fs::read_link(src)?;
    std::os::unix::fs::symlink(&target, dst).map_err(|e| Error::Filesystem {
        message: format!("Failed to create symlink '{}': {}", dst.display(), e),
    })
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    copy_file(src, dst)
}

/// Remove whatever is at `path`. Missing paths are not an error.
pub fn remove_path(path: &Path) -> Result<()> {
    let result = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => Err(e),
    };
    result.map_err(|e| Error::Filesystem {
        message: format!("Failed to remove '{}': {}", path.display(), e),
    })
}

/// Replace the content of `path` via a temporary sibling file.
///
/// Keeps the permission bits of an existing destination.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let previous = fs::metadata(path).ok().map(|meta| meta.permissions());

    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(|e| Error::Filesystem {
        message: format!(
            "Failed to create temporary file in '{}': {}",
            parent.display(),
            e
        ),
    })?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    if let Some(permissions) = previous {
        fs::set_permissions(temp.path(), permissions)?;
    }
    temp.persist(path).map_err(|e| Error::Filesystem {
        message: format!("Failed to replace '{}': {}", path.display(), e.error),
    })?;
    Ok(())
}
