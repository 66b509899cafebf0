//! Scenario tests for the controller.
//!
//! - `determinism.rs`: same seed and inputs give bit-identical ships
//! - `integration.rs`: end-to-end behaviour over many ticks
//! - `equivalence.rs`: grid-backed and linear-scan queries agree
//! - `helpers.rs`: fleet builders and measurement utilities

mod equivalence;
mod helpers;

pub use helpers::*;
