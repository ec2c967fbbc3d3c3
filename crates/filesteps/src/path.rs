//! Path normalization for step arguments.
//!
//! Test scripts pass directories either as absolute paths or relative to the
//! process working directory (`./logs`, `../out`). Relative paths that start
//! with `.` are anchored to a working directory before any listing happens.

use std::path::{Component, Path, PathBuf};

use crate::error::{Result, StepError};

/// Resolves `raw` against `cwd` when it starts with `.`.
///
/// The joined path is normalized lexically: `.` components are dropped and
/// `..` pops the previous component. Paths that do not start with `.` are
/// returned unchanged.
pub fn resolve_path(raw: &Path, cwd: &Path) -> PathBuf {
    if !starts_with_dot(raw) {
        return raw.to_path_buf();
    }
    normalize_lexically(&cwd.join(raw))
}

/// Resolves `raw` against the process working directory.
pub fn resolve_from_current_dir(raw: &Path) -> Result<PathBuf> {
    if !starts_with_dot(raw) {
        return Ok(raw.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|error| {
        StepError::InvalidInput(format!("current directory is unavailable: {error}"))
    })?;
    Ok(resolve_path(raw, &cwd))
}

fn starts_with_dot(path: &Path) -> bool {
    path.to_string_lossy().starts_with('.')
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Never pop past the root or a drive prefix.
                let popped = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if popped {
                    normalized.pop();
                } else if normalized.as_os_str().is_empty() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
