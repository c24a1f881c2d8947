//! DecentraFund daemon: replays campaign scenarios against a platform instance.

mod scenario;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use dfund_node::{init_logging, EventBus, LogFormat, Platform, PlatformConfig, PlatformEvent};
use dfund_nullables::NullClock;
use dfund_types::{Clock, SystemClock};

use crate::scenario::{Runner, Scenario, StepOutput};

#[derive(Parser)]
#[command(name = "dfund-daemon", about = "DecentraFund milestone escrow daemon")]
struct Cli {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "DFUND_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "DFUND_LOG_FORMAT")]
    log_format: Option<String>,

    /// Milestone voting window in seconds for newly created campaigns.
    #[arg(long, env = "DFUND_VOTING_PERIOD_SECS")]
    voting_period_secs: Option<u64>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "DFUND_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run a scenario file and print every step result and event as JSON lines.
    Run {
        /// Scenario TOML file.
        #[arg(long)]
        scenario: PathBuf,

        /// Stop at the first failing step instead of reporting it and continuing.
        #[arg(long)]
        fail_fast: bool,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[derive(Serialize)]
struct StepReport<'a> {
    step: usize,
    action: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<StepOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn load_config(cli: &Cli) -> anyhow::Result<PlatformConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let path = path.to_string_lossy();
            PlatformConfig::from_toml_file(&path)
                .with_context(|| format!("loading config {path}"))?
        }
        None => PlatformConfig::default(),
    };
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.parse::<LogFormat>()?;
    }
    if let Some(secs) = cli.voting_period_secs {
        config.voting_period_secs = secs;
    }
    Ok(config)
}

fn run(config: &PlatformConfig, path: &std::path::Path, fail_fast: bool) -> anyhow::Result<()> {
    let scenario = Scenario::from_toml_file(path)?;
    let start = scenario.start.unwrap_or_else(|| SystemClock.now().as_secs());
    let clock = Arc::new(NullClock::new(start));

    let mut bus = EventBus::new();
    bus.subscribe(Box::new(|event: &PlatformEvent| match serde_json::to_string(event) {
        Ok(line) => println!("{line}"),
        Err(e) => tracing::warn!(error = %e, "failed to serialize event"),
    }));
    let platform = Platform::with_bus(config, scenario.operator_address()?, clock.clone(), bus)?;
    let mut runner = Runner::new(platform, clock, scenario.accounts.clone());

    tracing::info!(scenario = %path.display(), steps = scenario.steps.len(), start, "running scenario");
    let mut failures = 0usize;
    for (index, step) in scenario.steps.iter().enumerate() {
        let report = match runner.run_step(step) {
            Ok(output) => StepReport {
                step: index,
                action: step.action(),
                result: Some(output),
                error: None,
            },
            Err(e) => {
                if fail_fast {
                    return Err(e.context(format!("step {index} ({})", step.action())));
                }
                failures += 1;
                tracing::warn!(step = index, action = step.action(), error = %e, "step failed");
                StepReport {
                    step: index,
                    action: step.action(),
                    result: None,
                    error: Some(format!("{e:#}")),
                }
            }
        };
        println!("{}", serde_json::to_string(&report)?);
    }
    tracing::info!(steps = scenario.steps.len(), failures, "scenario finished");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match &cli.command {
        Command::Config => {
            print!("{}", config.to_toml_string()?);
        }
        Command::Run {
            scenario,
            fail_fast,
        } => {
            init_logging(config.log_format, &config.log_level)?;
            run(&config, scenario, *fail_fast)?;
        }
    }
    Ok(())
}
