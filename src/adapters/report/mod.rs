//! Report Adapter
//!
//! Console tables and file export for simulation output.

pub mod export;
pub mod table;

pub use export::{
    write_csv_bundle, write_fine_csv, write_report_json, write_series_json, write_sweep_csv,
    write_sweep_json, write_trades_csv, ExportError, FINE_CSV, TRADES_CSV,
};
pub use table::{render_series, render_summary, render_sweep, render_trades};
