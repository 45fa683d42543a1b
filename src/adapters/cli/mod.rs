//! CLI Adapter
//!
//! Command-line interface for the interval arbitrage simulator.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{
    CliApp, Command, GenerateCmd, MarketArgs, RunCmd, SweepCmd, DEFAULT_CONFIG_PATH,
};

use anyhow::Result;

/// Execute the CLI command
pub fn execute(app: CliApp) -> Result<()> {
    commands::execute(app)
}
