//! Ports Layer - Trait definitions at the component seams
//!
//! The generator publishes coarse anchors through `AnchorLookup`; the
//! strategy only ever sees that trait, so tests can drive it with
//! hand-built anchors from `mocks`.

pub mod anchor;
pub mod mocks;

pub use anchor::{AnchorLookup, AnchorQuote};
pub use mocks::MockAnchors;
