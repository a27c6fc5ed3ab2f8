use serde::Deserialize;

/// The agent's last_run_summary.yaml.
///
/// Only the fields the checks look at are modelled; anything else in the
/// file is ignored. Every section is optional so that a summary missing a
/// key still loads and the checks can report what is missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RunSummary {
    #[serde(default)]
    pub version: VersionSection,
    #[serde(default)]
    pub time: Option<TimeSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VersionSection {
    /// Catalog version, the epoch seconds it was compiled at.
    /// `None` when no catalog was received.
    #[serde(default)]
    pub config: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TimeSection {
    /// Epoch seconds the last run finished at
    #[serde(default)]
    pub last_run: Option<i64>,
    /// Wall clock seconds the last run took
    #[serde(default)]
    pub total: Option<f64>,
}
