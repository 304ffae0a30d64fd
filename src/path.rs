//! Path canonicalization and logical path utilities

use crate::error::RegistryError;
use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// Split a slash-delimited logical path into normalized segments.
///
/// Segments are NFC-normalized; empty segments (from leading, trailing, or
/// doubled slashes) are dropped.
pub fn split_logical(logical: &str) -> Vec<String> {
    logical
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.nfc().collect())
        .collect()
}

/// Join normalized segments under the given root.
pub fn resolve_under(root: &Path, segments: &[String]) -> PathBuf {
    let mut path = root.to_path_buf();
    for segment in segments {
        path.push(segment);
    }
    path
}

/// Canonicalize a path for catalog storage.
///
/// Uses dunce for cross-platform canonicalization (no UNC paths on Windows),
/// then normalizes Unicode to NFC and strips trailing separators.
pub fn canonicalize(path: &Path) -> Result<PathBuf, RegistryError> {
    let canonical = dunce::canonicalize(path)?;
    Ok(PathBuf::from(normalize_string(
        &canonical.to_string_lossy(),
    )))
}

/// Normalize a path string without filesystem access.
pub fn normalize_string(path: &str) -> String {
    let mut result: String = path.nfc().collect();
    if result.len() > 1 {
        while result.ends_with('/') || result.ends_with('\\') {
            result.pop();
        }
    }
    result
}
