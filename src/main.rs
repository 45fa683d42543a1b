//! interval-arb - Coarse/Fine Interval Arbitrage Simulator
//!
//! Generates a seeded two-tier price series and replays an anchor mean
//! reversion strategy over it.

use anyhow::Result;
use clap::Parser;

use interval_arb::adapters::cli::{self, CliApp};

fn main() -> Result<()> {
    // Load .env file if it exists (RUST_LOG goes here)
    dotenvy::dotenv().ok();

    let app = CliApp::parse();
    cli::execute(app)
}
