//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{CandleKind, ReplayConfig};
use crate::domain::config_validation::{
    parse_bound, validate_backtest_config, validate_strategy_config,
};
use crate::domain::engine::{self, RunReport};
use crate::domain::error::ReplayError;
use crate::domain::heikin_ashi::heikin_ashi;
use crate::domain::ledger::Ledger;
use crate::domain::metrics::Metrics;
use crate::domain::resample::ResampleMode;
use crate::domain::signal::MovingAverageCrossover;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "tickreplay", about = "Historical price replay backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay historical data through the strategy
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Sample file, overrides [backtest] data
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Write the transaction log as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the time range covered by a sample file
    Info {
        #[arg(short, long)]
        data: PathBuf,
    },
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            data,
            output,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config, data.as_deref())
            } else {
                run_backtest(&config, data.as_deref(), output.as_deref())
            }
        }
        Command::Info { data } => run_info(&data),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ReplayError> {
    FileConfigAdapter::from_file(path).map_err(|e| ReplayError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn fail(err: &ReplayError) -> ExitCode {
    tracing::error!("{err}");
    err.into()
}

/// Validate both config sections and assemble a [`ReplayConfig`].
pub fn build_replay_config(adapter: &dyn ConfigPort) -> Result<ReplayConfig, ReplayError> {
    validate_backtest_config(adapter)?;
    validate_strategy_config(adapter)?;

    let mode = adapter
        .get_string("backtest", "mode")
        .and_then(|s| ResampleMode::parse(&s))
        .unwrap_or_default();
    let candles = adapter
        .get_string("strategy", "candles")
        .and_then(|s| CandleKind::parse(&s))
        .unwrap_or_default();
    let window_size = adapter.get_int("strategy", "window_size", 0);

    Ok(ReplayConfig {
        initial_cash: adapter.get_double("backtest", "initial_cash", 0.0),
        start: parse_bound(adapter, "start")?,
        end: parse_bound(adapter, "end")?,
        interval: adapter.get_int("backtest", "interval", 0),
        mode,
        window_size: usize::try_from(window_size).map_err(|_| ReplayError::ConfigInvalid {
            section: "strategy".into(),
            key: "window_size".into(),
            reason: format!("window_size {window_size} out of range"),
        })?,
        candles,
    })
}

/// The `--data` flag wins over `[backtest] data`.
pub fn resolve_data_path(
    data_override: Option<&Path>,
    adapter: &dyn ConfigPort,
) -> Option<PathBuf> {
    match data_override {
        Some(p) => Some(p.to_path_buf()),
        None => adapter
            .get_string("backtest", "data")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from),
    }
}

/// Replay entry point: samples in `[start, end]` are resampled, optionally
/// smoothed, and fed through the moving-average strategy.
pub fn run_pipeline(
    data_port: &dyn DataPort,
    config: &ReplayConfig,
) -> Result<RunReport, ReplayError> {
    let (first, last, count) = data_port.get_data_range()?.ok_or(ReplayError::NoData {
        start: config.start,
        end: config.end,
    })?;
    tracing::info!(first, last, count, "data range");

    if config.start < first || config.start > last {
        return Err(ReplayError::ConfigInvalid {
            section: "backtest".into(),
            key: "start".into(),
            reason: format!("start {} outside data range [{first}, {last}]", config.start),
        });
    }
    if config.end < first || config.end > last {
        return Err(ReplayError::ConfigInvalid {
            section: "backtest".into(),
            key: "end".into(),
            reason: format!("end {} outside data range [{first}, {last}]", config.end),
        });
    }

    let samples = data_port.fetch_samples(config.start, config.end)?;
    if samples.is_empty() {
        return Err(ReplayError::NoData {
            start: config.start,
            end: config.end,
        });
    }

    let mut candles = config.mode.apply(&samples, config.interval)?;
    if config.candles == CandleKind::HeikinAshi {
        candles = heikin_ashi(&candles);
    }
    tracing::info!(
        samples = samples.len(),
        candles = candles.len(),
        mode = %config.mode,
        interval = config.interval,
        kind = %config.candles,
        "resampled"
    );

    engine::run(
        Ledger::new(config.initial_cash),
        &candles,
        config.window_size,
        &MovingAverageCrossover,
    )
}

pub fn log_summary(report: &RunReport) {
    let metrics = Metrics::compute(report);
    tracing::info!("=== Results ({}) ===", report.policy);
    tracing::info!("Candles:          {}", report.candles_processed);
    tracing::info!("Window size:      {}", report.window_size);
    tracing::info!("Initial cash:     {:.2}", metrics.initial_cash);
    tracing::info!("Final cash:       {:.2}", metrics.final_cash);
    tracing::info!("Total return:     {:.2}%", metrics.total_return * 100.0);
    tracing::info!("Max drawdown:     -{:.1}%", metrics.max_drawdown * 100.0);
    tracing::info!("Transactions:     {}", metrics.transactions);
    tracing::info!("Entries:          {}", metrics.entries);
    tracing::info!("Rejected:         {}", metrics.rejections);

    for rejection in &report.rejections {
        tracing::info!(
            "  rejected {} at {}: {}",
            rejection.operation,
            rejection.timestamp,
            rejection.error
        );
    }
}

fn load_replay_config(
    config_path: &Path,
) -> Result<(FileConfigAdapter, ReplayConfig), ReplayError> {
    tracing::info!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;
    let config = build_replay_config(&adapter)?;
    Ok((adapter, config))
}

fn run_backtest(
    config_path: &Path,
    data_override: Option<&Path>,
    output: Option<&Path>,
) -> ExitCode {
    let (adapter, config) = match load_replay_config(config_path) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    let Some(data_path) = resolve_data_path(data_override, &adapter) else {
        return fail(&ReplayError::ConfigMissing {
            section: "backtest".into(),
            key: "data".into(),
        });
    };
    tracing::info!("Loading samples from {}", data_path.display());
    let data_port = CsvAdapter::new(data_path);

    let report = match run_pipeline(&data_port, &config) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };
    log_summary(&report);

    if let Some(output) = output {
        let path = output.display().to_string();
        if let Err(e) = CsvReportAdapter::new().write(&report, &path) {
            return fail(&e);
        }
    }

    ExitCode::SUCCESS
}

fn run_dry_run(config_path: &Path, data_override: Option<&Path>) -> ExitCode {
    let (adapter, config) = match load_replay_config(config_path) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    tracing::info!("Config validated successfully");
    tracing::info!("  initial_cash: {:.2}", config.initial_cash);
    tracing::info!("  range:        [{}, {}]", config.start, config.end);
    tracing::info!("  interval:     {} ({})", config.interval, config.mode);
    tracing::info!("  window_size:  {}", config.window_size);
    tracing::info!("  candles:      {}", config.candles);

    match resolve_data_path(data_override, &adapter) {
        Some(p) => tracing::info!("  data:         {}", p.display()),
        None => tracing::warn!("  data:         not configured"),
    }

    tracing::info!("Dry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_info(data_path: &Path) -> ExitCode {
    let adapter = CsvAdapter::new(data_path.to_path_buf());
    match adapter.get_data_range() {
        Ok(Some((first, last, count))) => {
            println!("{first},{last},{count}");
            tracing::info!("{count} samples from {first} to {last}");
            ExitCode::SUCCESS
        }
        Ok(None) => fail(&ReplayError::NoData {
            start: i64::MIN,
            end: i64::MAX,
        }),
        Err(e) => fail(&e),
    }
}
