use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("Cannot list directory {}: {source}", path.display())]
    ListDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, StepError>;
