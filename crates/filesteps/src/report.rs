//! Test report sinks.
//!
//! Steps do not fail by returning errors when the world does not match
//! expectations. They write graded entries (success, failure, warning...) to a
//! [`Reporter`], and the surrounding test run decides what a failure means.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

/// Log target used by [`LogReporter`].
pub const REPORT_TARGET: &str = "filesteps::report";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportLevel {
    Info,
    Warn,
    Error,
    Success,
    Failure,
}

impl ReportLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }

    /// Whether the entry marks the step as unsuccessful.
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Error | Self::Failure)
    }
}

impl fmt::Display for ReportLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait Reporter {
    /// Records one entry. `category` groups related entries, e.g. `Validation`.
    fn report(&self, level: ReportLevel, category: Option<&str>, message: &str);

    fn info(&self, message: &str) {
        self.report(ReportLevel::Info, None, message);
    }

    fn warn(&self, message: &str) {
        self.report(ReportLevel::Warn, None, message);
    }

    fn error(&self, message: &str) {
        self.report(ReportLevel::Error, None, message);
    }

    fn success(&self, category: &str, message: &str) {
        self.report(ReportLevel::Success, Some(category), message);
    }

    fn failure(&self, category: &str, message: &str) {
        self.report(ReportLevel::Failure, Some(category), message);
    }
}

impl<T: Reporter + ?Sized> Reporter for &T {
    fn report(&self, level: ReportLevel, category: Option<&str>, message: &str) {
        (**self).report(level, category, message);
    }
}

/// Forwards report entries to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, level: ReportLevel, category: Option<&str>, message: &str) {
        let log_level = match level {
            ReportLevel::Info | ReportLevel::Success => log::Level::Info,
            ReportLevel::Warn => log::Level::Warn,
            ReportLevel::Error | ReportLevel::Failure => log::Level::Error,
        };
        match category {
            Some(category) => {
                log::log!(target: REPORT_TARGET, log_level, "[{level}] {category}: {message}")
            }
            None => log::log!(target: REPORT_TARGET, log_level, "[{level}] {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub level: ReportLevel,
    pub category: Option<String>,
    pub message: String,
}

/// Keeps every entry in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    entries: Mutex<Vec<ReportEntry>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<ReportEntry> {
        self.entries.lock().clone()
    }

    pub fn entries_at(&self, level: ReportLevel) -> Vec<ReportEntry> {
        self.entries
            .lock()
            .iter()
            .filter(|entry| entry.level == level)
            .cloned()
            .collect()
    }

    pub fn count(&self, level: ReportLevel) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|entry| entry.level == level)
            .count()
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, level: ReportLevel, category: Option<&str>, message: &str) {
        self.entries.lock().push(ReportEntry {
            level,
            category: category.map(ToString::to_string),
            message: message.to_string(),
        });
    }
}

/// Wraps a reporter and counts failing entries.
///
/// The count lives in the wrapper, so each run owns its own tally.
#[derive(Debug, Default)]
pub struct Tally<R> {
    inner: R,
    failures: AtomicUsize,
}

impl<R: Reporter> Tally<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            failures: AtomicUsize::new(0),
        }
    }

    /// Number of `Error` and `Failure` entries seen so far.
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Reporter> Reporter for Tally<R> {
    fn report(&self, level: ReportLevel, category: Option<&str>, message: &str) {
        if level.is_failure() {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
        self.inner.report(level, category, message);
    }
}
