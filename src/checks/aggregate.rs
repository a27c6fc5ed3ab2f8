use std::io::Write;

use crate::error::CheckError;
use crate::models::{CheckResult, Severity};

/// Collects check results for one run and tracks the worst severity seen.
#[derive(Debug, Clone, Default)]
pub struct MonitoringStatus {
    worst: Severity,
    results: Vec<CheckResult>,
}

impl MonitoringStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a result. Only a strictly more severe result raises the status.
    pub fn add_result(&mut self, severity: Severity, message: impl Into<String>) {
        if severity > self.worst {
            self.worst = severity;
        }
        self.results.push(CheckResult::new(severity, message));
    }

    /// Record a fault as a WARNING carrying its description
    pub fn add_error(&mut self, error: &CheckError) {
        self.add_result(Severity::Warning, error.to_string());
    }

    pub fn severity(&self) -> Severity {
        self.worst
    }

    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    /// One `[SEVERITY] message` line per result, in the order recorded
    pub fn render(&self) -> String {
        self.results
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Write the report, one line per result, to `out`
    pub fn write_report<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        if !self.results.is_empty() {
            writeln!(out, "{}", self.render())?;
        }
        out.flush()
    }

    /// Consume the status, yielding the severity to exit with
    pub fn finalize(self) -> Severity {
        self.worst
    }
}
