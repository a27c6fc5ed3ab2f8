use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::checks::ThresholdPair;

/// Complete configuration for one check run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    pub thresholds: ThresholdsConfig,
    pub files: FilesConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdsConfig {
    /// Age of the last finished run
    pub run_age: ThresholdPair,
    /// Age of the catalog applied by the last run
    pub catalog_age: ThresholdPair,
    /// Duration of the last run, and age of a run in progress
    pub run_duration: ThresholdPair,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// The agent's last_run_summary.yaml
    pub summary: PathBuf,
    /// Present while the agent is administratively disabled
    pub disabled_lock: PathBuf,
    /// Present while a catalog run is in progress
    pub run_lock: PathBuf,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            run_age: ThresholdPair::new(65 * 60, 130 * 60),
            catalog_age: ThresholdPair::new(65 * 60, 130 * 60),
            run_duration: ThresholdPair::new(20 * 60, 30 * 60),
        }
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            summary: PathBuf::from("/var/lib/puppet/state/last_run_summary.yaml"),
            disabled_lock: PathBuf::from("/var/lib/puppet/state/agent_disabled.lock"),
            run_lock: PathBuf::from("/var/lib/puppet/state/agent_catalog_run.lock"),
        }
    }
}

impl CheckConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: CheckConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults if no file was given
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    /// Threshold pairs with the names used in configuration warnings
    pub fn named_thresholds(&self) -> [(&'static str, &ThresholdPair); 3] {
        [
            ("run-age", &self.thresholds.run_age),
            ("catalog-age", &self.thresholds.catalog_age),
            ("run-duration", &self.thresholds.run_duration),
        ]
    }
}
