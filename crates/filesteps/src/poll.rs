//! Bounded polling of directory queries.
//!
//! Both pollers evaluate the query once up front, then keep re-evaluating
//! until the condition holds or a deadline taken from the monotonic clock at
//! start has passed. Neither can be cancelled once started.

use std::time::{Duration, Instant};

use crate::error::Result;
use crate::fs::FileSystem;
use crate::query::FileQuery;
use crate::report::Reporter;

/// Category used for outcome entries.
pub const VALIDATION_CATEGORY: &str = "Validation";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollResult {
    /// The condition held; carries the matching file count.
    Found(usize),
    /// The deadline passed first; carries the last observed count.
    TimedOut { last_count: usize },
}

impl PollResult {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// The file count of the final evaluation.
    pub fn count(&self) -> usize {
        match *self {
            Self::Found(count) => count,
            Self::TimedOut { last_count } => last_count,
        }
    }
}

/// Counts the files matching `query`. Listing failures are propagated.
pub fn count_files_matching<F: FileSystem + ?Sized>(fs: &F, query: &FileQuery) -> Result<usize> {
    Ok(fs.list_files(query)?.len())
}

/// Polls until exactly `expected_count` files match or `timeout` elapses.
///
/// A zero `timeout` evaluates once. Between evaluations the loop sleeps
/// `spin_interval`; a zero interval spins without yielding the thread.
pub fn poll_until_count_matches<F: FileSystem + ?Sized>(
    fs: &F,
    query: &FileQuery,
    expected_count: usize,
    timeout: Duration,
    spin_interval: Duration,
) -> Result<PollResult> {
    let deadline = Instant::now().checked_add(timeout);
    let mut count = count_files_matching(fs, query)?;
    let mut evaluations = 1usize;

    while count != expected_count && before_deadline(deadline) {
        if spin_interval.is_zero() {
            std::hint::spin_loop();
        } else {
            std::thread::sleep(spin_interval);
        }
        count = count_files_matching(fs, query)?;
        evaluations += 1;
    }

    log::debug!(
        "count poll for {query} finished after {evaluations} evaluation(s): expected {expected_count}, found {count}"
    );

    if count == expected_count {
        Ok(PollResult::Found(count))
    } else {
        Ok(PollResult::TimedOut { last_count: count })
    }
}

/// Polls every `interval` until at least one file matches or `duration`
/// elapses, then reports the outcome.
///
/// The outcome goes to `reporter` only: success when a file was found,
/// failure on timeout. `Err` is returned only when listing fails.
pub fn poll_until_exists<F, R>(
    fs: &F,
    reporter: &R,
    query: &FileQuery,
    duration: Duration,
    interval: Duration,
) -> Result<()>
where
    F: FileSystem + ?Sized,
    R: Reporter + ?Sized,
{
    let deadline = Instant::now().checked_add(duration);
    let mut found = count_files_matching(fs, query)? > 0;

    while !found && before_deadline(deadline) {
        std::thread::sleep(interval);
        found = count_files_matching(fs, query)? > 0;
    }

    let message = if found {
        format!(
            "File with pattern '{}' was found in directory '{}'.",
            query.pattern(),
            query.path().display()
        )
    } else {
        format!(
            "File with pattern '{}' wasn't found in directory '{}'.",
            query.pattern(),
            query.path().display()
        )
    };

    if found {
        reporter.success(VALIDATION_CATEGORY, &message);
    } else {
        reporter.failure(VALIDATION_CATEGORY, &message);
    }
    Ok(())
}

/// A deadline too far out to represent never expires.
fn before_deadline(deadline: Option<Instant>) -> bool {
    deadline.map_or(true, |deadline| Instant::now() < deadline)
}
