//! Directory queries: a directory plus a compiled filename pattern.

use std::fmt;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::error::{Result, StepError};

/// A directory to search and the glob pattern file names must match.
///
/// Patterns support `*`, `?` and `[...]` and are matched against the file
/// name only, never against the directory part.
#[derive(Debug, Clone)]
pub struct FileQuery {
    path: PathBuf,
    pattern: Pattern,
    case_sensitive: bool,
}

impl FileQuery {
    /// Compiles a query using the platform's default case sensitivity.
    pub fn new(path: impl Into<PathBuf>, pattern: &str) -> Result<Self> {
        Self::with_case_sensitivity(path, pattern, default_case_sensitive())
    }

    /// Compiles a query with explicit case sensitivity.
    pub fn with_case_sensitivity(
        path: impl Into<PathBuf>,
        pattern: &str,
        case_sensitive: bool,
    ) -> Result<Self> {
        if pattern.is_empty() {
            return Err(StepError::InvalidPattern("pattern is empty".to_string()));
        }
        if pattern.contains('/') || pattern.contains('\\') {
            return Err(StepError::InvalidPattern(format!(
                "{pattern}: pattern must not contain path separators"
            )));
        }
        let compiled = Pattern::new(pattern)
            .map_err(|error| StepError::InvalidPattern(format!("{pattern}: {error}")))?;
        Ok(Self {
            path: path.into(),
            pattern: compiled,
            case_sensitive,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the pattern as written by the caller.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Checks a bare file name against the pattern.
    pub fn matches_name(&self, name: &str) -> bool {
        let options = MatchOptions {
            case_sensitive: self.case_sensitive,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        self.pattern.matches_with(name, options)
    }
}

impl fmt::Display for FileQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' in '{}'", self.pattern(), self.path.display())
    }
}

/// Windows file systems are case insensitive by default.
pub fn default_case_sensitive() -> bool {
    !cfg!(windows)
}
