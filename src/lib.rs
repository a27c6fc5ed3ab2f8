pub mod checks;
pub mod config;
pub mod error;
pub mod models;
pub mod state;

// Re-export main types
pub use checks::{AgentCheck, MonitoringStatus, ThresholdPair, evaluate, format_duration};
pub use config::CheckConfig;
pub use error::{CheckError, Result};
pub use models::{CheckResult, RunSummary, Severity};
