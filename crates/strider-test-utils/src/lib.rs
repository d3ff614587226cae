//! Shared test fixtures and utilities for Strider crates.
//!
//! Provides deterministic RNG setup and random preview states/decisions so
//! property-style tests stay reproducible.

pub mod rng;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use rng::{deterministic_vec, random_decisions, random_state, seeded_rng};
