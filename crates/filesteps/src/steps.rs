//! Reusable file steps invoked by test scripts.
//!
//! Every step resolves dot-relative directory arguments against the working
//! directory first, then works through the configured [`FileSystem`] and
//! writes its outcome to the configured [`Reporter`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::config::StepsConfig;
use crate::error::Result;
use crate::fs::FileSystem;
use crate::path::resolve_from_current_dir;
use crate::poll::{poll_until_count_matches, poll_until_exists, VALIDATION_CATEGORY};
use crate::query::FileQuery;
use crate::report::Reporter;

#[cfg(test)]
mod tests;

/// Timestamp format embedded in log file names.
pub const LOG_FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Outcome of [`FileSteps::delete_files`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeleteSummary {
    pub deleted: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl DeleteSummary {
    pub fn attempted(&self) -> usize {
        self.deleted.len() + self.failed.len()
    }
}

pub struct FileSteps<F, R> {
    fs: F,
    reporter: R,
    config: StepsConfig,
}

impl<F: FileSystem, R: Reporter> FileSteps<F, R> {
    pub fn new(fs: F, reporter: R, config: StepsConfig) -> Self {
        Self {
            fs,
            reporter,
            config,
        }
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn config(&self) -> &StepsConfig {
        &self.config
    }

    /// Writes `text` to `<prefix>_<yyyyMMdd_HHmmss>.<extension>` in the
    /// output directory.
    ///
    /// Failing to create or write the file never fails the step: the error
    /// goes to the diagnostic log and `None` is returned.
    pub fn write_to_file(
        &self,
        text: &str,
        filename_prefix: &str,
        file_extension: &str,
    ) -> Option<PathBuf> {
        let filename = log_file_name(filename_prefix, file_extension, Local::now());
        self.reporter.info(&filename);

        let output_dir = match resolve_from_current_dir(&self.config.output_dir) {
            Ok(dir) => dir,
            Err(error) => {
                log::error!("cannot resolve log output directory: {error}");
                return None;
            }
        };
        let path = output_dir.join(&filename);
        match std::fs::write(&path, text.as_bytes()) {
            Ok(()) => Some(path),
            Err(error) => {
                log::error!("failed to write log file {}: {error}", path.display());
                None
            }
        }
    }

    /// Checks that exactly `expected_count` files match `pattern` in `path`,
    /// waiting up to `timeout` for the count to settle.
    ///
    /// Returns whether the count matched. A mismatch is reported as a
    /// validation failure, not returned as an error.
    pub fn check_files_exist(
        &self,
        path: &Path,
        pattern: &str,
        expected_count: usize,
        timeout: Duration,
    ) -> Result<bool> {
        let query = self.query(path, pattern)?;
        let result = poll_until_count_matches(
            &self.fs,
            &query,
            expected_count,
            timeout,
            self.config.spin_interval(),
        )?;

        self.reporter.info(&format!(
            "Check if '{expected_count}' file(s) with pattern '{pattern}' exist in the directory '{}'. Search time {} seconds.",
            query.path().display(),
            timeout.as_secs_f64()
        ));

        let summary = format!("expected {expected_count}, found {}", result.count());
        if result.is_found() {
            self.reporter.success(
                VALIDATION_CATEGORY,
                &format!("File count matches for {query}: {summary}."),
            );
        } else {
            self.reporter.failure(
                VALIDATION_CATEGORY,
                &format!("File count mismatch for {query}: {summary}."),
            );
        }
        Ok(result.is_found())
    }

    /// Deletes every file matching `pattern` in `path`.
    ///
    /// Each deletion is attempted once; failures are reported per file and do
    /// not stop the remaining deletions.
    pub fn delete_files(&self, path: &Path, pattern: &str) -> Result<DeleteSummary> {
        let query = self.query(path, pattern)?;
        let files = self.fs.list_files(&query)?;

        let mut summary = DeleteSummary::default();
        if files.is_empty() {
            self.reporter.warn(&format!(
                "No files have been found in '{}' with the pattern '{pattern}'.",
                query.path().display()
            ));
            return Ok(summary);
        }

        for file in files {
            match self.fs.delete_file(&file) {
                Ok(()) => {
                    self.reporter
                        .info(&format!("File has been deleted: {}", file.display()));
                    summary.deleted.push(file);
                }
                Err(error) => {
                    let message = format!("{}: {error}", file.display());
                    self.reporter.error(&message);
                    summary.failed.push((file, error.to_string()));
                }
            }
        }
        Ok(summary)
    }

    /// Waits up to `duration` for a file matching `pattern` to appear in
    /// `path`, checking every `interval`. The outcome is only reported.
    pub fn wait_for_file(
        &self,
        path: &Path,
        pattern: &str,
        duration: Duration,
        interval: Duration,
    ) -> Result<()> {
        let query = self.query(path, pattern)?;
        poll_until_exists(&self.fs, &self.reporter, &query, duration, interval)
    }

    fn query(&self, path: &Path, pattern: &str) -> Result<FileQuery> {
        let resolved = resolve_from_current_dir(path)?;
        FileQuery::with_case_sensitivity(resolved, pattern, self.config.case_sensitive)
    }
}

/// Builds `<prefix>_<timestamp>.<extension>`.
pub fn log_file_name(prefix: &str, extension: &str, now: DateTime<Local>) -> String {
    format!(
        "{prefix}_{}.{extension}",
        now.format(LOG_FILE_TIMESTAMP_FORMAT)
    )
}
