use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use filesteps::{FileSteps, LocalFileSystem, LogReporter, StepsConfig, Tally};

#[derive(Parser, Debug)]
#[command(name = "filesteps")]
#[command(about = "File-system steps for test automation scripts", long_about = None)]
#[command(version)]
struct Args {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    step: Step,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Step {
    /// Write text to a timestamped log file
    WriteLog {
        #[arg(long)]
        text: String,
        #[arg(long)]
        prefix: String,
        #[arg(long, default_value = "log")]
        extension: String,
    },
    /// Check that exactly N files match a pattern, waiting up to a timeout
    CheckCount {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        pattern: String,
        #[arg(long)]
        expected: usize,
        /// Timeout in seconds
        #[arg(long, default_value_t = 0)]
        timeout: u64,
    },
    /// Delete files matching a pattern
    Delete {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        pattern: String,
    },
    /// Wait for a file matching a pattern to appear
    WaitFor {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        pattern: String,
        /// Duration in milliseconds
        #[arg(long)]
        duration: u64,
        /// Interval between checks in milliseconds
        #[arg(long, default_value_t = 100)]
        interval: u64,
    },
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            log::error!("{error}");
            ExitCode::from(2)
        }
    }
}

/// Runs one step. Returns `false` when the step reported a failure or error.
fn run(args: Args) -> Result<bool, Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => StepsConfig::load(path)?,
        None => StepsConfig::default(),
    };
    log::debug!("using config {config:?}");

    let steps = FileSteps::new(LocalFileSystem, Tally::new(LogReporter), config);
    let mut passed = true;

    match args.step {
        Step::WriteLog {
            text,
            prefix,
            extension,
        } => {
            if let Some(path) = steps.write_to_file(&text, &prefix, &extension) {
                log::info!("wrote {}", path.display());
            }
        }
        Step::CheckCount {
            path,
            pattern,
            expected,
            timeout,
        } => {
            passed =
                steps.check_files_exist(&path, &pattern, expected, Duration::from_secs(timeout))?;
        }
        Step::Delete { path, pattern } => {
            let summary = steps.delete_files(&path, &pattern)?;
            log::info!(
                "deleted {} of {} file(s)",
                summary.deleted.len(),
                summary.attempted()
            );
        }
        Step::WaitFor {
            path,
            pattern,
            duration,
            interval,
        } => {
            steps.wait_for_file(
                &path,
                &pattern,
                Duration::from_millis(duration),
                Duration::from_millis(interval),
            )?;
        }
    }

    Ok(passed && steps.reporter().failures() == 0)
}
