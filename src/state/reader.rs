//! Reads the agent's persisted state from disk.
//!
//! Each file is read fully into memory and closed before parsing.

use chrono::{DateTime, Local};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

use crate::error::{CheckError, Result};
use crate::models::RunSummary;

/// Contents of the disabled lock, written by `puppet agent --disable`
#[derive(Debug, Deserialize)]
struct DisabledRecord {
    disabled_message: String,
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| CheckError::from_io(path, e))
}

/// Load and parse the run summary.
///
/// Missing keys are not an error here; only a missing, unreadable or
/// syntactically broken file is.
pub fn load_run_summary(path: &Path) -> Result<RunSummary> {
    let content = read_file(path)?;
    let summary: RunSummary =
        serde_yaml::from_str(&content).map_err(|source| CheckError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("Loaded run summary from {}", path.display());
    Ok(summary)
}

/// Look for a lock marker, returning its modification time if present.
///
/// Absence is the normal case and not an error.
pub fn check_lock_marker(path: &Path) -> Result<Option<DateTime<Local>>> {
    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No lock marker at {}", path.display());
            return Ok(None);
        }
        Err(e) => return Err(CheckError::from_io(path, e)),
    };

    let modified = metadata
        .modified()
        .map_err(|e| CheckError::from_io(path, e))?;
    let modified: DateTime<Local> = modified.into();

    debug!("Found lock marker at {} ({})", path.display(), modified);
    Ok(Some(modified))
}

/// Read the reason the agent was disabled from the disabled lock.
///
/// The agent writes this file as JSON, which parses as YAML.
pub fn read_disabled_reason(path: &Path) -> Result<String> {
    let content = read_file(path)?;
    let record: DisabledRecord =
        serde_yaml::from_str(&content).map_err(|source| CheckError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(record.disabled_message)
}
