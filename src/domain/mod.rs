//! Domain Layer - Core value types for the interval arbitrage simulator
//!
//! Pure data types with no I/O. The generator produces price points,
//! the strategy turns them into positions and trades, and `summary`
//! derives reporting views from the finished ledger.

pub mod price;
pub mod position;
pub mod trade;
pub mod summary;

pub use price::{CoarsePricePoint, FinePricePoint};
pub use position::{Position, Side};
pub use trade::{ExitReason, Trade};
pub use summary::{cumulative_pnl, PnlPoint, TradeSummary};
