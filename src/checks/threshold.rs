use serde::{Deserialize, Serialize};

use crate::models::Severity;

/// Warning and critical bounds in seconds. A bound `<= 0` is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdPair {
    pub warning: i64,
    pub critical: i64,
}

impl ThresholdPair {
    pub fn new(warning: i64, critical: i64) -> Self {
        Self { warning, critical }
    }

    pub fn warning_enabled(&self) -> bool {
        self.warning > 0
    }

    pub fn critical_enabled(&self) -> bool {
        self.critical > 0
    }

    /// Both bounds enabled but warning is not below critical
    pub fn is_misordered(&self) -> bool {
        self.warning_enabled() && self.critical_enabled() && self.warning >= self.critical
    }

    pub fn evaluate(&self, measured: f64) -> Severity {
        evaluate(measured, self.warning, self.critical)
    }
}

/// Classify a measured age or duration against a pair of bounds.
///
/// Critical is tested first. Reaching a bound counts as breaching it.
pub fn evaluate(measured: f64, warning: i64, critical: i64) -> Severity {
    if critical > 0 && measured >= critical as f64 {
        Severity::Critical
    } else if warning > 0 && measured >= warning as f64 {
        Severity::Warning
    } else {
        Severity::Ok
    }
}
