//! Filesystem operations
//!
//! Directory and path helpers for the build helpers, and the removal of
//! shared libraries that forces the linker onto static archives.

use std::path::{Path, PathBuf};

use crate::core::platform::PlatformCaps;
use crate::error::FilesystemError;

/// Create a directory and all parent directories
pub fn create_dir_all(path: &Path) -> Result<(), FilesystemError> {
    std::fs::create_dir_all(path).map_err(|e| FilesystemError::CreateDir {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Read content from a file
pub fn read_file(path: &Path) -> Result<String, FilesystemError> {
    std::fs::read_to_string(path).map_err(|e| FilesystemError::ReadFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Anchor a relative path at the working directory
///
/// Absolute paths are returned as they are; nothing is resolved on disk.
pub fn absolute_path(path: &Path) -> Result<PathBuf, FilesystemError> {
    std::path::absolute(path).map_err(|e| FilesystemError::Absolute {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Remove a directory tree; a missing directory is not an error
pub fn remove_dir_all_if_exists(path: &Path) -> Result<(), FilesystemError> {
    if !path.exists() {
        return Ok(());
    }
    std::fs::remove_dir_all(path).map_err(|e| FilesystemError::RemoveDir {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Find the directory holding `file_name`, at most `max_depth` levels down
///
/// Source archives unpack into a single top-level directory whose name
/// varies by version, so the script is searched rather than assumed.
/// Shallower matches win, then lexicographic order.
pub fn find_dir_containing(root: &Path, file_name: &str, max_depth: usize) -> Option<PathBuf> {
    walkdir::WalkDir::new(root)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && e.file_name() == file_name)
        .min_by_key(|e| e.depth())
        .and_then(|e| e.path().parent().map(Path::to_path_buf))
}

/// Delete every shared library under `<install_dir>/lib`
///
/// Leaves only static archives for the linker to pick. Running it again
/// removes nothing. Returns the removed paths.
pub fn strip_dynamic_artifacts(
    install_dir: &Path,
    platform: &PlatformCaps,
) -> Result<Vec<PathBuf>, FilesystemError> {
    let lib_dir = install_dir.join("lib");
    tracing::info!("Removing dynamic libs from {} ...", lib_dir.display());

    let entries = std::fs::read_dir(&lib_dir).map_err(|e| FilesystemError::ReadDir {
        path: lib_dir.clone(),
        error: e.to_string(),
    })?;

    let mut removed = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| FilesystemError::ReadDir {
            path: lib_dir.clone(),
            error: e.to_string(),
        })?;
        let file_name = entry.file_name();
        if !platform.is_dynamic_library(&file_name.to_string_lossy()) {
            continue;
        }

        let path = entry.path();
        std::fs::remove_file(&path).map_err(|e| FilesystemError::RemoveFile {
            path: path.clone(),
            error: e.to_string(),
        })?;
        tracing::debug!("removed {}", path.display());
        removed.push(path);
    }

    removed.sort();
    Ok(removed)
}
