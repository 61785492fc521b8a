//! Agent directory reconciliation.
//!
//! Merges the authoritative agent listing with the live telemetry listing
//! into one deduplicated, ordered view. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Source contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Merge and orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
