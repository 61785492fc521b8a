//! Execution dispatch for directory agents.
//!
//! Issues "execute" instructions to a streaming backend while guaranteeing
//! at most one in-flight execution per agent:
//!
//! - Domain types in [`domain`]
//! - Backend contract and progress channel in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - The per-agent ledger and coordinator in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
