//! Adapters Layer - Edges of the simulator
//!
//! - CLI: Command-line interface handlers
//! - Report: Console tables plus JSON and CSV export

pub mod cli;
pub mod report;

pub use cli::CliApp;
