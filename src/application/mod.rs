//! Application Layer - Use cases wiring generator and strategy
//!
//! - `simulation`: one seeded generate-then-replay run
//! - `sweep`: the same run across several coarse interval lengths

pub mod simulation;
pub mod sweep;

pub use simulation::{RealizedHalfLives, Simulation, SimulationError, SimulationReport};
pub use sweep::{run_interval_sweep, SweepError, SweepRow};
