//! File-system steps for test automation scripts.
//!
//! This crate provides the reusable file actions a test run needs:
//! - Bounded polling of a directory until a file-count condition holds
//! - Waiting for a file to appear
//! - Deleting files that match a pattern
//! - Writing timestamped log files

pub mod config;
pub mod error;
pub mod fs;
pub mod path;
pub mod poll;
pub mod query;
pub mod report;
pub mod steps;

// Re-export main types
pub use config::StepsConfig;
pub use error::{Result, StepError};
pub use fs::{FileSystem, LocalFileSystem};
pub use path::{resolve_from_current_dir, resolve_path};
pub use poll::{count_files_matching, poll_until_count_matches, poll_until_exists, PollResult};
pub use query::FileQuery;
pub use report::{LogReporter, MemoryReporter, ReportEntry, ReportLevel, Reporter, Tally};
pub use steps::{DeleteSummary, FileSteps};
