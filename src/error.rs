//! Faults that can interrupt a check run.
//!
//! None of these ever reach the process boundary: the orchestrator turns
//! the first one it sees into a single WARNING line.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckError {
    /// A state file that must exist is missing
    #[error("No such file or directory: {}", path.display())]
    NotFound { path: PathBuf },

    /// A state file exists but could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A state file is not valid YAML or has the wrong shape
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Cannot format negative time span of {0} seconds")]
    NegativeDuration(f64),

    #[error("Time span of {0} seconds is not a finite number")]
    InvalidDuration(f64),

    #[error("Timestamp {0} is out of range")]
    InvalidTimestamp(i64),
}

impl CheckError {
    /// Classify an I/O failure on `path`, keeping "not found" distinct.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            CheckError::NotFound { path }
        } else {
            CheckError::Io { path, source }
        }
    }
}

pub type Result<T> = std::result::Result<T, CheckError>;
