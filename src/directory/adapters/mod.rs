//! Adapter implementations for the agent listing ports.

pub mod memory;
