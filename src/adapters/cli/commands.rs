//! CLI Command Handlers
//!
//! Implementation of all CLI commands for the interval arbitrage simulator.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::adapters::report;
use crate::application::{run_interval_sweep, Simulation};
use crate::config::{load_config, Config};
use crate::market::MarketParams;
use crate::strategy::{ExitReference, StrategyConfig};

/// Config file picked up when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "config/simulation.toml";

/// interval-arb - Coarse/fine price interval arbitrage simulator
#[derive(Parser, Debug)]
#[command(
    name = "interval-arb",
    version = env!("CARGO_PKG_VERSION"),
    about = "Simulate mean reversion arbitrage between coarse and fine price intervals",
    long_about = "interval-arb generates a seeded two-tier Ornstein-Uhlenbeck price series \
                  (coarse anchors with nested fine walks) and replays a single-position \
                  mean reversion strategy that trades fine prices against their anchor."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a series and replay the strategy over it
    Run(RunCmd),

    /// Generate a price series only
    Generate(GenerateCmd),

    /// Compare coarse interval lengths over a fixed horizon
    Sweep(SweepCmd),
}

impl Command {
    fn config_path(&self) -> Option<&Path> {
        match self {
            Command::Run(cmd) => cmd.market.config.as_deref(),
            Command::Generate(cmd) => cmd.market.config.as_deref(),
            Command::Sweep(cmd) => cmd.market.config.as_deref(),
        }
    }

    fn market_args(&self) -> &MarketArgs {
        match self {
            Command::Run(cmd) => &cmd.market,
            Command::Generate(cmd) => &cmd.market,
            Command::Sweep(cmd) => &cmd.market,
        }
    }
}

/// Config file and market overrides shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct MarketArgs {
    /// Path to configuration file (default: config/simulation.toml if present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override random seed
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Override coarse interval length in seconds
    #[arg(long, value_name = "SECS")]
    pub coarse_secs: Option<u64>,

    /// Override fine interval length in seconds
    #[arg(long, value_name = "SECS")]
    pub fine_secs: Option<u64>,

    /// Override number of coarse intervals
    #[arg(long, value_name = "COUNT")]
    pub intervals: Option<usize>,
}

impl MarketArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(seed) = self.seed {
            config.market.seed = seed;
        }
        if let Some(secs) = self.coarse_secs {
            config.market.coarse_interval_secs = secs;
        }
        if let Some(secs) = self.fine_secs {
            config.market.fine_interval_secs = secs;
        }
        if let Some(count) = self.intervals {
            config.market.coarse_intervals = count;
        }
    }
}

/// Run a full simulation
#[derive(Parser, Debug)]
pub struct RunCmd {
    #[command(flatten)]
    pub market: MarketArgs,

    /// Override entry threshold (price units from anchor)
    #[arg(long, value_name = "DISTANCE")]
    pub entry_threshold: Option<f64>,

    /// Measure take-profit/stop-loss from "anchor" or "entry"
    #[arg(long, value_name = "REF")]
    pub exit_reference: Option<ExitReference>,

    /// Print every trade in the ledger
    #[arg(short, long)]
    pub trades: bool,

    /// Export series, ledger and summary to JSON
    #[arg(long, value_name = "FILE")]
    pub export_json: Option<PathBuf>,

    /// Export trades.csv and fine.csv into a directory
    #[arg(long, value_name = "DIR")]
    pub export_csv: Option<PathBuf>,
}

/// Generate a price series
#[derive(Parser, Debug)]
pub struct GenerateCmd {
    #[command(flatten)]
    pub market: MarketArgs,

    /// Export the series to JSON
    #[arg(long, value_name = "FILE")]
    pub export_json: Option<PathBuf>,

    /// Export the fine series to CSV
    #[arg(long, value_name = "FILE")]
    pub export_csv: Option<PathBuf>,
}

/// Sweep coarse interval lengths
#[derive(Parser, Debug)]
pub struct SweepCmd {
    #[command(flatten)]
    pub market: MarketArgs,

    /// Coarse interval lengths in seconds (overrides [sweep] in config)
    #[arg(long, value_name = "SECS", value_delimiter = ',')]
    pub coarse_list: Vec<u64>,

    /// Measure take-profit/stop-loss from "anchor" or "entry"
    #[arg(long, value_name = "REF")]
    pub exit_reference: Option<ExitReference>,

    /// Export sweep rows to JSON
    #[arg(long, value_name = "FILE")]
    pub export_json: Option<PathBuf>,

    /// Export sweep rows to CSV
    #[arg(long, value_name = "FILE")]
    pub export_csv: Option<PathBuf>,
}

/// Execute the CLI command
pub fn execute(app: CliApp) -> Result<()> {
    let mut config = resolve_config(app.command.config_path())?;
    app.command.market_args().apply(&mut config);
    config
        .validate()
        .context("Invalid parameters after command-line overrides")?;

    init_logging(app.verbose, app.debug, &config.logging.level)?;

    match app.command {
        Command::Run(cmd) => run_command(cmd, &config),
        Command::Generate(cmd) => generate_command(cmd, &config),
        Command::Sweep(cmd) => sweep_command(cmd, &config),
    }
}

/// Explicit path must load; otherwise fall back to the default file, then built-in defaults
fn resolve_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => load_config(DEFAULT_CONFIG_PATH)
            .with_context(|| format!("Failed to load configuration from {}", DEFAULT_CONFIG_PATH)),
        None => Ok(Config::default()),
    }
}

/// Initialize logging system
///
/// Flags win, then `RUST_LOG`, then the config file's level.
fn init_logging(verbose: bool, debug: bool, config_level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config_level))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {e}"))
}

fn strategy_for(config: &Config, threshold: Option<f64>, reference: Option<ExitReference>) -> StrategyConfig {
    let mut strategy = StrategyConfig::from(config);
    if let Some(threshold) = threshold {
        strategy.entry_threshold = threshold;
    }
    if let Some(reference) = reference {
        strategy.exit_reference = reference;
    }
    strategy
}

/// Handle run command
fn run_command(cmd: RunCmd, config: &Config) -> Result<()> {
    tracing::info!("Starting simulation run");

    let strategy = strategy_for(config, cmd.entry_threshold, cmd.exit_reference);
    let sim = Simulation::new(MarketParams::from(config), strategy)
        .context("Invalid simulation parameters")?;
    let report = sim.run().context("Simulation failed")?;

    println!("{}", report::render_summary(&report, sim.market(), sim.strategy()));
    if cmd.trades {
        println!();
        println!("{}", report::render_trades(&report.trades));
    }

    if let Some(path) = cmd.export_json {
        report::write_report_json(&path, &report)
            .with_context(|| format!("Failed to export JSON to {}", path.display()))?;
        println!("✓ JSON written to {}", path.display());
    }

    if let Some(dir) = cmd.export_csv {
        let paths = report::write_csv_bundle(&dir, &report.trades, &report.series)
            .with_context(|| format!("Failed to export CSV to {}", dir.display()))?;
        for path in paths {
            println!("✓ CSV written to {}", path.display());
        }
    }

    Ok(())
}

/// Handle generate command
fn generate_command(cmd: GenerateCmd, config: &Config) -> Result<()> {
    let sim = Simulation::new(MarketParams::from(config), StrategyConfig::from(config))
        .context("Invalid simulation parameters")?;
    let series = sim.generate();
    let realized = sim.realized_half_lives(&series);

    println!("{}", report::render_series(&series, sim.market(), &realized));

    if let Some(path) = cmd.export_json {
        report::write_series_json(&path, &series)
            .with_context(|| format!("Failed to export JSON to {}", path.display()))?;
        println!("✓ JSON written to {}", path.display());
    }

    if let Some(path) = cmd.export_csv {
        report::write_fine_csv(&path, &series)
            .with_context(|| format!("Failed to export CSV to {}", path.display()))?;
        println!("✓ CSV written to {}", path.display());
    }

    Ok(())
}

/// Handle sweep command
fn sweep_command(cmd: SweepCmd, config: &Config) -> Result<()> {
    let intervals = if cmd.coarse_list.is_empty() {
        config.sweep.coarse_interval_secs.clone()
    } else {
        cmd.coarse_list
    };
    tracing::info!(?intervals, "Starting interval sweep");

    let strategy = strategy_for(config, None, cmd.exit_reference);
    let rows = run_interval_sweep(&MarketParams::from(config), &strategy, &intervals)
        .context("Interval sweep failed")?;

    println!("{}", report::render_sweep(&rows));

    if let Some(path) = cmd.export_json {
        report::write_sweep_json(&path, &rows)
            .with_context(|| format!("Failed to export JSON to {}", path.display()))?;
        println!("✓ JSON written to {}", path.display());
    }

    if let Some(path) = cmd.export_csv {
        report::write_sweep_csv(&path, &rows)
            .with_context(|| format!("Failed to export CSV to {}", path.display()))?;
        println!("✓ CSV written to {}", path.display());
    }

    Ok(())
}
