//! JSON configuration shared by all steps.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, StepError};
use crate::query::default_case_sensitive;

pub const DEFAULT_SPIN_INTERVAL_MS: u64 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StepsConfig {
    /// Directory log files are written to. Dot-relative paths follow the
    /// working directory.
    pub output_dir: PathBuf,
    /// Pause between evaluations of the count poller. Zero busy-polls.
    pub spin_interval_ms: u64,
    pub case_sensitive: bool,
}

impl Default for StepsConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            spin_interval_ms: DEFAULT_SPIN_INTERVAL_MS,
            case_sensitive: default_case_sensitive(),
        }
    }
}

impl StepsConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|error| {
            StepError::Config(format!(
                "failed to read config file {}: {error}",
                path.display()
            ))
        })?;
        Self::from_json(&bytes).map_err(|error| match error {
            StepError::Config(message) => {
                StepError::Config(format!("{}: {message}", path.display()))
            }
            other => other,
        })
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|error| StepError::Config(format!("config parse error: {error}")))
    }

    pub fn spin_interval(&self) -> Duration {
        Duration::from_millis(self.spin_interval_ms)
    }
}
