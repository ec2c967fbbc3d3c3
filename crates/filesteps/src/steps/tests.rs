use super::*;
use crate::error::StepError;
use crate::fs::LocalFileSystem;
use crate::report::{MemoryReporter, ReportLevel};
use chrono::TimeZone;
use parking_lot::Mutex;
use std::io;
use tempfile::tempdir;

/// Local file system that refuses to delete chosen files and records every
/// delete call.
struct GuardedFs {
    protected: Vec<PathBuf>,
    delete_calls: Mutex<Vec<PathBuf>>,
}

impl GuardedFs {
    fn new(protected: Vec<PathBuf>) -> Self {
        Self {
            protected,
            delete_calls: Mutex::new(Vec::new()),
        }
    }
}

impl FileSystem for GuardedFs {
    fn list_files(&self, query: &FileQuery) -> Result<Vec<PathBuf>> {
        LocalFileSystem.list_files(query)
    }

    fn delete_file(&self, path: &Path) -> io::Result<()> {
        self.delete_calls.lock().push(path.to_path_buf());
        if self.protected.iter().any(|protected| protected == path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "permission denied",
            ));
        }
        LocalFileSystem.delete_file(path)
    }
}

fn steps_with<F: FileSystem>(fs: F) -> FileSteps<F, MemoryReporter> {
    FileSteps::new(fs, MemoryReporter::new(), StepsConfig::default())
}

fn touch(dir: &Path, names: &[&str]) {
    for name in names {
        std::fs::write(dir.join(name), b"x").expect("write");
    }
}

#[test]
fn log_file_name_embeds_timestamp() {
    let now = Local
        .with_ymd_and_hms(2024, 3, 7, 9, 5, 1)
        .single()
        .expect("valid local time");
    assert_eq!(log_file_name("run", "log", now), "run_20240307_090501.log");
}

#[test]
fn write_to_file_creates_file_with_text() {
    let dir = tempdir().expect("tempdir");
    let config = StepsConfig {
        output_dir: dir.path().to_path_buf(),
        ..StepsConfig::default()
    };
    let steps = FileSteps::new(LocalFileSystem, MemoryReporter::new(), config);

    let path = steps
        .write_to_file("hello wörld", "trace", "txt")
        .expect("written");
    assert_eq!(path.parent(), Some(dir.path()));
    let name = path
        .file_name()
        .expect("file name")
        .to_string_lossy()
        .to_string();
    assert!(name.starts_with("trace_"));
    assert!(name.ends_with(".txt"));
    assert_eq!("trace_yyyyMMdd_HHmmss.txt".len(), name.len());
    assert_eq!(std::fs::read(&path).expect("read"), "hello wörld".as_bytes());

    let infos = steps.reporter().entries_at(ReportLevel::Info);
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].message, name);
}

#[test]
fn write_to_file_failure_is_not_fatal() {
    let dir = tempdir().expect("tempdir");
    let config = StepsConfig {
        output_dir: dir.path().join("missing"),
        ..StepsConfig::default()
    };
    let steps = FileSteps::new(LocalFileSystem, MemoryReporter::new(), config);

    assert!(steps.write_to_file("text", "trace", "log").is_none());
    assert_eq!(steps.reporter().count(ReportLevel::Failure), 0);
    assert_eq!(steps.reporter().count(ReportLevel::Error), 0);
}

#[test]
fn check_files_exist_reports_success() {
    let dir = tempdir().expect("tempdir");
    touch(dir.path(), &["a.csv", "b.csv", "c.txt"]);
    let steps = steps_with(LocalFileSystem);

    let matched = steps
        .check_files_exist(dir.path(), "*.csv", 2, Duration::from_secs(1))
        .expect("check");
    assert!(matched);

    let reporter = steps.reporter();
    let infos = reporter.entries_at(ReportLevel::Info);
    assert_eq!(infos.len(), 1);
    assert_eq!(
        infos[0].message,
        format!(
            "Check if '2' file(s) with pattern '*.csv' exist in the directory '{}'. Search time 1 seconds.",
            dir.path().display()
        )
    );
    assert_eq!(reporter.count(ReportLevel::Success), 1);
    assert_eq!(reporter.count(ReportLevel::Failure), 0);
}

#[test]
fn check_files_exist_reports_expected_and_actual_on_mismatch() {
    let dir = tempdir().expect("tempdir");
    touch(dir.path(), &["a.csv"]);
    let steps = steps_with(LocalFileSystem);

    let matched = steps
        .check_files_exist(dir.path(), "*.csv", 3, Duration::ZERO)
        .expect("check");
    assert!(!matched);

    let failures = steps.reporter().entries_at(ReportLevel::Failure);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].category.as_deref(), Some(VALIDATION_CATEGORY));
    assert!(failures[0].message.contains("'*.csv'"));
    assert!(failures[0]
        .message
        .contains(&dir.path().display().to_string()));
    assert!(failures[0].message.contains("expected 3, found 1"));
}

#[test]
fn check_files_exist_propagates_missing_directory() {
    let dir = tempdir().expect("tempdir");
    let steps = steps_with(LocalFileSystem);
    let err = steps
        .check_files_exist(&dir.path().join("nope"), "*", 0, Duration::ZERO)
        .expect_err("missing directory");
    assert!(matches!(err, StepError::ListDirectory { .. }));
    assert!(steps.reporter().entries().is_empty());
}

#[test]
fn delete_with_no_matches_warns_and_deletes_nothing() {
    let dir = tempdir().expect("tempdir");
    touch(dir.path(), &["keep.txt"]);
    let steps = steps_with(GuardedFs::new(Vec::new()));

    let summary = steps.delete_files(dir.path(), "*.log").expect("delete");
    assert_eq!(summary, DeleteSummary::default());
    assert!(steps.fs.delete_calls.lock().is_empty());

    let warnings = steps.reporter().entries_at(ReportLevel::Warn);
    assert_eq!(warnings.len(), 1);
    assert_eq!(
        warnings[0].message,
        format!(
            "No files have been found in '{}' with the pattern '*.log'.",
            dir.path().display()
        )
    );
    assert!(dir.path().join("keep.txt").exists());
}

#[test]
fn delete_continues_after_a_failure() {
    let dir = tempdir().expect("tempdir");
    touch(dir.path(), &["a.log", "b.log", "c.log", "d.txt"]);
    let locked = dir.path().join("b.log");
    let steps = steps_with(GuardedFs::new(vec![locked.clone()]));

    let summary = steps.delete_files(dir.path(), "*.log").expect("delete");
    assert_eq!(summary.attempted(), 3);
    assert_eq!(
        summary.deleted,
        vec![dir.path().join("a.log"), dir.path().join("c.log")]
    );
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, locked);
    assert_eq!(steps.fs.delete_calls.lock().len(), 3);

    let reporter = steps.reporter();
    assert_eq!(reporter.count(ReportLevel::Info), 2);
    let errors = reporter.entries_at(ReportLevel::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("permission denied"));

    assert!(!dir.path().join("a.log").exists());
    assert!(locked.exists());
    assert!(!dir.path().join("c.log").exists());
    assert!(dir.path().join("d.txt").exists());
}

#[test]
fn delete_reports_each_deleted_file() {
    let dir = tempdir().expect("tempdir");
    touch(dir.path(), &["x.tmp"]);
    let steps = steps_with(LocalFileSystem);

    steps.delete_files(dir.path(), "*.tmp").expect("delete");
    let infos = steps.reporter().entries_at(ReportLevel::Info);
    assert_eq!(
        infos[0].message,
        format!("File has been deleted: {}", dir.path().join("x.tmp").display())
    );
}

#[test]
fn wait_for_file_reports_failure_when_absent() {
    let dir = tempdir().expect("tempdir");
    let steps = steps_with(LocalFileSystem);
    steps
        .wait_for_file(
            dir.path(),
            "*.ready",
            Duration::from_millis(30),
            Duration::from_millis(5),
        )
        .expect("wait");
    assert_eq!(steps.reporter().count(ReportLevel::Failure), 1);
}

#[test]
fn wait_for_file_reports_success_when_present() {
    let dir = tempdir().expect("tempdir");
    touch(dir.path(), &["job.ready"]);
    let steps = steps_with(LocalFileSystem);
    steps
        .wait_for_file(
            dir.path(),
            "*.ready",
            Duration::from_millis(30),
            Duration::from_millis(5),
        )
        .expect("wait");
    assert_eq!(steps.reporter().count(ReportLevel::Success), 1);
}

#[test]
fn invalid_pattern_fails_before_listing() {
    let dir = tempdir().expect("tempdir");
    let steps = steps_with(GuardedFs::new(Vec::new()));
    let err = steps
        .delete_files(dir.path(), "[oops")
        .expect_err("invalid pattern");
    assert!(matches!(err, StepError::InvalidPattern(_)));
    assert!(steps.reporter().entries().is_empty());
}

/// Records every query it is asked to list and reports no files.
#[derive(Default)]
struct RecordingFs {
    queries: Mutex<Vec<FileQuery>>,
}

impl FileSystem for RecordingFs {
    fn list_files(&self, query: &FileQuery) -> Result<Vec<PathBuf>> {
        self.queries.lock().push(query.clone());
        Ok(Vec::new())
    }

    fn delete_file(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn dot_relative_paths_are_resolved_before_listing() {
    let cwd = std::env::current_dir().expect("current dir");
    let steps = steps_with(RecordingFs::default());

    steps
        .check_files_exist(Path::new("./reports"), "*.xml", 0, Duration::ZERO)
        .expect("check");
    steps
        .delete_files(Path::new("./reports/../out"), "*.tmp")
        .expect("delete");
    steps
        .wait_for_file(Path::new("."), "*.ready", Duration::ZERO, Duration::ZERO)
        .expect("wait");

    let listed: Vec<PathBuf> = steps
        .fs
        .queries
        .lock()
        .iter()
        .map(|query| query.path().to_path_buf())
        .collect();
    assert_eq!(listed, vec![cwd.join("reports"), cwd.join("out"), cwd.clone()]);
    assert!(listed.iter().all(|path| path.is_absolute()));
}

#[test]
fn queries_use_configured_case_sensitivity() {
    let config = StepsConfig {
        case_sensitive: false,
        ..StepsConfig::default()
    };
    let steps = FileSteps::new(RecordingFs::default(), MemoryReporter::new(), config);
    assert!(!steps.config().case_sensitive);

    steps
        .check_files_exist(Path::new("/data"), "*.XML", 0, Duration::ZERO)
        .expect("check");

    let queries = steps.fs.queries.lock();
    assert_eq!(queries.len(), 1);
    assert!(!queries[0].case_sensitive());
    assert!(queries[0].matches_name("report.xml"));
}
