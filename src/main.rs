use clap::Parser;
use clap::error::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use check_puppet_agent::{AgentCheck, CheckConfig, MonitoringStatus, Severity};

/// Environment variable holding a full tracing filter directive
const LOG_ENV: &str = "CHECK_PUPPET_AGENT_LOG";

/// Check the health of the puppet agent from its state files.
///
/// Exits 0 (OK), 1 (WARNING) or 2 (CRITICAL). Any threshold <= 0 is disabled.
#[derive(Parser, Debug)]
#[command(name = "check-puppet-agent")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Warn if the last run finished at least this many seconds ago (default: 3900)
    #[arg(long, value_name = "SECONDS", allow_negative_numbers = true)]
    warning_run_age: Option<i64>,

    /// Critical if the last run finished at least this many seconds ago (default: 7800)
    #[arg(long, value_name = "SECONDS", allow_negative_numbers = true)]
    critical_run_age: Option<i64>,

    /// Warn if the applied catalog is at least this many seconds old (default: 3900)
    #[arg(long, value_name = "SECONDS", allow_negative_numbers = true)]
    warning_catalog_age: Option<i64>,

    /// Critical if the applied catalog is at least this many seconds old (default: 7800)
    #[arg(long, value_name = "SECONDS", allow_negative_numbers = true)]
    critical_catalog_age: Option<i64>,

    /// Warn if a run took, or is taking, at least this many seconds (default: 1200)
    #[arg(long, value_name = "SECONDS", allow_negative_numbers = true)]
    warning_run_duration: Option<i64>,

    /// Critical if a run took, or is taking, at least this many seconds (default: 1800)
    #[arg(long, value_name = "SECONDS", allow_negative_numbers = true)]
    critical_run_duration: Option<i64>,

    /// The puppet run summary to parse
    /// (default: /var/lib/puppet/state/last_run_summary.yaml)
    #[arg(long)]
    filename: Option<PathBuf>,

    /// Lock file present while the agent is disabled
    /// (default: /var/lib/puppet/state/agent_disabled.lock)
    #[arg(long)]
    disabled_lock_file: Option<PathBuf>,

    /// Lock file present while a catalog run is active
    /// (default: /var/lib/puppet/state/agent_catalog_run.lock)
    #[arg(long)]
    run_lock_file: Option<PathBuf>,

    /// YAML file with thresholds and paths; flags take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log diagnostics to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Apply explicitly given flags on top of `config`
    fn apply_overrides(&self, config: &mut CheckConfig) {
        let thresholds = &mut config.thresholds;
        let overrides = [
            (self.warning_run_age, &mut thresholds.run_age.warning),
            (self.critical_run_age, &mut thresholds.run_age.critical),
            (self.warning_catalog_age, &mut thresholds.catalog_age.warning),
            (self.critical_catalog_age, &mut thresholds.catalog_age.critical),
            (self.warning_run_duration, &mut thresholds.run_duration.warning),
            (self.critical_run_duration, &mut thresholds.run_duration.critical),
        ];
        for (flag, target) in overrides {
            if let Some(value) = flag {
                *target = value;
            }
        }

        if let Some(path) = &self.filename {
            config.files.summary = path.clone();
        }
        if let Some(path) = &self.disabled_lock_file {
            config.files.disabled_lock = path.clone();
        }
        if let Some(path) = &self.run_lock_file {
            config.files.run_lock = path.clone();
        }
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            // clap exits with 2 on usage errors, which would read as CRITICAL
            let rendered = e.to_string();
            let message = rendered
                .lines()
                .next()
                .unwrap_or("invalid arguments")
                .trim_start_matches("error: ");
            let mut status = MonitoringStatus::new();
            status.add_result(Severity::Warning, message);
            report_and_exit(status)
        }
    };

    init_logging(cli.verbose);

    let mut config = match CheckConfig::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            let mut status = MonitoringStatus::new();
            status.add_result(Severity::Warning, format!("{:#}", e));
            report_and_exit(status)
        }
    };
    cli.apply_overrides(&mut config);
    debug!("Effective configuration: {:?}", config);

    let status = AgentCheck::new(&config).run();
    report_and_exit(status)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout carries the monitoring report
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn report_and_exit(status: MonitoringStatus) -> ! {
    // A closed stdout must not turn into a panic exit code
    if let Err(e) = status.write_report(std::io::stdout().lock()) {
        warn!("Failed to write report: {}", e);
    }
    std::process::exit(status.finalize().exit_code())
}
