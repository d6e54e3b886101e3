//! Path utilities for input/output handling.
//!
//! This module provides helpers for deriving the default output path, comparing
//! input and output locations after resolution, and checking file extensions.

use crate::error::{Error, Result};

use std::path::{Path, PathBuf};

/// Suffix appended to the input stem to form the default output name.
pub const OUTPUT_STEM_SUFFIX: &str = "_vertical";

/// Converts a path to a string with fallback to lossy conversion.
///
/// # Arguments
///
/// * `path` - The path to convert
///
/// # Returns
///
/// * `String` - The path as a string, using lossy conversion if necessary
pub fn path_to_string_lossy(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Checks whether a path has the given extension, ignoring case.
///
/// # Arguments
///
/// * `path` - The path to check
/// * `extension` - The extension without leading dot (e.g. `"epub"`)
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Derives the default output path: `<stem>_vertical.<ext>` next to the input.
///
/// # Arguments
///
/// * `input` - The input book path
///
/// # Returns
///
/// * `Result<PathBuf>` - The derived path, or an error if the input has no file name
pub fn default_output_path(input: &Path) -> Result<PathBuf> {
    let stem = input.file_stem().ok_or_else(|| {
        Error::InvalidPath(input.to_path_buf(), "Path has no file name".to_string())
    })?;

    let mut file_name = stem.to_os_string();
    file_name.push(OUTPUT_STEM_SUFFIX);
    if let Some(extension) = input.extension() {
        file_name.push(".");
        file_name.push(extension);
    }
    Ok(input.with_file_name(file_name))
}

/// Resolves a path to an absolute form suitable for comparison.
///
/// Existing paths are canonicalized. For paths that do not exist yet (typical for
/// outputs), the parent directory is canonicalized when possible and the file name
/// re-attached; otherwise the path is made absolute against the working directory.
pub fn resolve_path(path: &Path) -> Result<PathBuf> {
    if let Ok(canonical) = path.canonicalize() {
        return Ok(canonical);
    }

    let parent = output_directory(path);
    match (parent.canonicalize(), path.file_name()) {
        (Ok(parent), Some(name)) => Ok(parent.join(name)),
        _ if path.is_absolute() => Ok(path.to_path_buf()),
        _ => Ok(std::env::current_dir()?.join(path)),
    }
}

/// Whether two paths refer to the same file location once resolved.
pub fn same_path(a: &Path, b: &Path) -> Result<bool> {
    Ok(resolve_path(a)? == resolve_path(b)?)
}

/// Directory a file path lives in; `.` for bare file names.
pub fn output_directory(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
