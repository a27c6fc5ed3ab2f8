//! Sequences the individual agent checks for one invocation.
//!
//! Order is fixed:
//! 1. threshold sanity (configuration hints only)
//! 2. agent disabled
//! 3. run in progress - when a run is active, the summary describes the
//!    previous run, so steps 4-6 are skipped
//! 4. catalog age
//! 5. last run age
//! 6. last run duration (only after step 5 found a timestamp)
//!
//! The first fault ends the run; results gathered so far are kept.

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::config::CheckConfig;
use crate::error::{CheckError, Result};
use crate::models::{RunSummary, Severity, TimeSection};
use crate::state::{check_lock_marker, load_run_summary, read_disabled_reason};

use super::aggregate::MonitoringStatus;
use super::duration::format_duration;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct AgentCheck<'a> {
    config: &'a CheckConfig,
    now: DateTime<Local>,
}

impl<'a> AgentCheck<'a> {
    pub fn new(config: &'a CheckConfig) -> Self {
        Self {
            config,
            now: Local::now(),
        }
    }

    /// Evaluate ages relative to `now` instead of the current time
    pub fn with_now(mut self, now: DateTime<Local>) -> Self {
        self.now = now;
        self
    }

    /// Run every check. Never fails: a fault becomes a WARNING result.
    pub fn run(&self) -> MonitoringStatus {
        let mut status = MonitoringStatus::new();

        if let Err(e) = self.evaluate(&mut status) {
            warn!("Check aborted: {}", e);
            status.add_error(&e);
        }

        info!(
            "Check finished with {} ({} results)",
            status.severity(),
            status.results().len()
        );
        status
    }

    fn evaluate(&self, status: &mut MonitoringStatus) -> Result<()> {
        self.validate_thresholds(status);
        self.check_disabled(status)?;

        if self.check_run_in_progress(status)? {
            debug!("Run in progress, skipping summary checks");
            return Ok(());
        }

        let summary = load_run_summary(&self.config.files.summary)?;
        self.check_catalog_age(&summary, status)?;

        if let Some(time) = self.check_last_run_age(&summary, status)? {
            self.check_last_run_duration(time, status)?;
        }

        Ok(())
    }

    fn validate_thresholds(&self, status: &mut MonitoringStatus) {
        for (name, pair) in self.config.named_thresholds() {
            if pair.is_misordered() {
                status.add_result(
                    Severity::Warning,
                    format!(
                        "warning-{name} ({}) should be lower than critical-{name} ({})",
                        pair.warning, pair.critical
                    ),
                );
            }
        }
    }

    fn check_disabled(&self, status: &mut MonitoringStatus) -> Result<()> {
        let path = &self.config.files.disabled_lock;
        if check_lock_marker(path)?.is_some() {
            let reason = read_disabled_reason(path)?;
            status.add_result(
                Severity::Warning,
                format!("puppet agent is disabled - reason: {}", reason),
            );
        }
        Ok(())
    }

    /// Returns true when a run is active
    fn check_run_in_progress(&self, status: &mut MonitoringStatus) -> Result<bool> {
        let Some(started) = check_lock_marker(&self.config.files.run_lock)? else {
            return Ok(false);
        };

        let age = self.age_of(started);
        let severity = self.config.thresholds.run_duration.evaluate(age);
        status.add_result(
            severity,
            format!(
                "puppet run active since {} ({} ago)",
                started.format(DATE_FORMAT),
                format_duration(age)?
            ),
        );
        Ok(true)
    }

    fn check_catalog_age(&self, summary: &RunSummary, status: &mut MonitoringStatus) -> Result<()> {
        let Some(compiled_at) = summary.version.config else {
            status.add_result(
                Severity::Warning,
                "no catalog received - catalog compile failed?",
            );
            return Ok(());
        };

        let compiled_at = from_epoch(compiled_at)?;
        let age = self.age_of(compiled_at);
        let severity = self.config.thresholds.catalog_age.evaluate(age);
        status.add_result(
            severity,
            format!(
                "applying catalog compiled at {} ({} ago)",
                compiled_at.format(DATE_FORMAT),
                format_duration(age)?
            ),
        );
        Ok(())
    }

    /// Returns the timing section when it holds a last run timestamp
    fn check_last_run_age<'s>(
        &self,
        summary: &'s RunSummary,
        status: &mut MonitoringStatus,
    ) -> Result<Option<&'s TimeSection>> {
        let Some(time) = summary.time.as_ref() else {
            self.report_missing("time", status);
            return Ok(None);
        };
        let Some(last_run) = time.last_run else {
            self.report_missing("time.last_run", status);
            return Ok(None);
        };

        let last_run = from_epoch(last_run)?;
        let age = self.age_of(last_run);
        let severity = self.config.thresholds.run_age.evaluate(age);
        status.add_result(
            severity,
            format!(
                "last run on {} ({} ago)",
                last_run.format(DATE_FORMAT),
                format_duration(age)?
            ),
        );
        Ok(Some(time))
    }

    fn check_last_run_duration(
        &self,
        time: &TimeSection,
        status: &mut MonitoringStatus,
    ) -> Result<()> {
        let Some(total) = time.total else {
            self.report_missing("time.total", status);
            return Ok(());
        };

        let severity = self.config.thresholds.run_duration.evaluate(total);
        status.add_result(
            severity,
            format!("=> last run took {}", format_duration(total)?),
        );
        Ok(())
    }

    fn report_missing(&self, field: &str, status: &mut MonitoringStatus) {
        status.add_result(
            Severity::Warning,
            format!(
                "Can not find {} in {}",
                field,
                self.config.files.summary.display()
            ),
        );
    }

    /// Seconds elapsed since `then`, clamped at zero for timestamps ahead
    /// of the local clock
    fn age_of(&self, then: DateTime<Local>) -> f64 {
        let age = (self.now - then).num_milliseconds() as f64 / 1000.0;
        if age < 0.0 {
            warn!("Timestamp {} lies in the future, treating age as 0", then);
            return 0.0;
        }
        age
    }
}

fn from_epoch(seconds: i64) -> Result<DateTime<Local>> {
    DateTime::from_timestamp(seconds, 0)
        .map(|utc| utc.with_timezone(&Local))
        .ok_or(CheckError::InvalidTimestamp(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::ThresholdPair;
    use chrono::Duration;
    use std::path::Path;
    use tempfile::TempDir;

    fn config_in(dir: &Path) -> CheckConfig {
        let mut config = CheckConfig::default();
        config.files.summary = dir.join("last_run_summary.yaml");
        config.files.disabled_lock = dir.join("agent_disabled.lock");
        config.files.run_lock = dir.join("agent_catalog_run.lock");
        config
    }

    fn write_summary(config: &CheckConfig, content: &str) {
        std::fs::write(&config.files.summary, content).unwrap();
    }

    fn fixed_now() -> DateTime<Local> {
        from_epoch(1_700_000_000).unwrap()
    }

    fn messages(status: &MonitoringStatus) -> Vec<&str> {
        status.results().iter().map(|r| r.message.as_str()).collect()
    }

    #[test]
    fn test_from_epoch_out_of_range() {
        assert!(matches!(
            from_epoch(i64::MAX),
            Err(CheckError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_misordered_thresholds_warn_but_continue() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(dir.path());
        config.thresholds.run_age = ThresholdPair::new(7200, 3600);
        let now = fixed_now();
        write_summary(
            &config,
            &format!(
                "version:\n  config: {t}\ntime:\n  last_run: {t}\n  total: 10\n",
                t = now.timestamp()
            ),
        );

        let status = AgentCheck::new(&config).with_now(now).run();
        let msgs = messages(&status);
        assert_eq!(
            msgs[0],
            "warning-run-age (7200) should be lower than critical-run-age (3600)"
        );
        assert_eq!(msgs.len(), 4);
        assert_eq!(status.severity(), Severity::Warning);
    }

    #[test]
    fn test_missing_time_section_skips_duration() {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path());
        let now = fixed_now();
        write_summary(
            &config,
            &format!("version:\n  config: {}\n", now.timestamp()),
        );

        let status = AgentCheck::new(&config).with_now(now).run();
        let msgs = messages(&status);
        assert_eq!(msgs.len(), 2);
        assert!(msgs[0].starts_with("applying catalog compiled at"));
        assert_eq!(
            msgs[1],
            format!("Can not find time in {}", config.files.summary.display())
        );
        assert_eq!(status.severity(), Severity::Warning);
    }

    #[test]
    fn test_missing_last_run_skips_duration() {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path());
        let now = fixed_now();
        write_summary(
            &config,
            &format!(
                "version:\n  config: {}\ntime:\n  total: 12.5\n",
                now.timestamp()
            ),
        );

        let status = AgentCheck::new(&config).with_now(now).run();
        let msgs = messages(&status);
        assert_eq!(msgs.len(), 2);
        assert!(msgs[1].starts_with("Can not find time.last_run in"));
    }

    #[test]
    fn test_missing_total() {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path());
        let now = fixed_now();
        write_summary(
            &config,
            &format!(
                "version:\n  config: {t}\ntime:\n  last_run: {t}\n",
                t = now.timestamp()
            ),
        );

        let status = AgentCheck::new(&config).with_now(now).run();
        let msgs = messages(&status);
        assert_eq!(msgs.len(), 3);
        assert!(msgs[1].starts_with("last run on"));
        assert!(msgs[2].starts_with("Can not find time.total in"));
    }

    #[test]
    fn test_stale_catalog_is_critical() {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path());
        let now = fixed_now();
        let old = (now - Duration::hours(3)).timestamp();
        write_summary(
            &config,
            &format!(
                "version:\n  config: {}\ntime:\n  last_run: {}\n  total: 30\n",
                old,
                now.timestamp()
            ),
        );

        let status = AgentCheck::new(&config).with_now(now).run();
        assert_eq!(status.results()[0].severity, Severity::Critical);
        assert!(
            status.results()[0]
                .message
                .ends_with("(3 hours 0 minutes 0 seconds ago)")
        );
        assert_eq!(status.severity(), Severity::Critical);
    }

    #[test]
    fn test_slow_run_duration_warns() {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path());
        let now = fixed_now();
        write_summary(
            &config,
            &format!(
                "version:\n  config: {t}\ntime:\n  last_run: {t}\n  total: 1300.2\n",
                t = now.timestamp()
            ),
        );

        let status = AgentCheck::new(&config).with_now(now).run();
        let last = status.results().last().unwrap();
        assert_eq!(last.severity, Severity::Warning);
        assert_eq!(last.message, "=> last run took 21 minutes 40 seconds");
    }

    #[test]
    fn test_negative_total_is_a_fault() {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path());
        let now = fixed_now();
        write_summary(
            &config,
            &format!(
                "version:\n  config: {t}\ntime:\n  last_run: {t}\n  total: -3\n",
                t = now.timestamp()
            ),
        );

        let status = AgentCheck::new(&config).with_now(now).run();
        let last = status.results().last().unwrap();
        assert_eq!(last.severity, Severity::Warning);
        assert!(last.message.contains("negative time span"));
        assert_eq!(status.results().len(), 3);
    }

    #[test]
    fn test_nan_total_is_not_called_negative() {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path());
        let now = fixed_now();
        write_summary(
            &config,
            &format!(
                "version:\n  config: {t}\ntime:\n  last_run: {t}\n  total: .nan\n",
                t = now.timestamp()
            ),
        );

        let status = AgentCheck::new(&config).with_now(now).run();
        let last = status.results().last().unwrap();
        assert_eq!(last.severity, Severity::Warning);
        assert_eq!(last.message, "Time span of NaN seconds is not a finite number");
    }

    #[test]
    fn test_future_timestamp_counts_as_fresh() {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path());
        let now = fixed_now();
        let ahead = (now + Duration::minutes(5)).timestamp();
        write_summary(
            &config,
            &format!(
                "version:\n  config: {t}\ntime:\n  last_run: {t}\n  total: 1\n",
                t = ahead
            ),
        );

        let status = AgentCheck::new(&config).with_now(now).run();
        assert_eq!(status.severity(), Severity::Ok);
        assert!(status.results()[0].message.ends_with("(0 seconds ago)"));
    }
}
