//! Adapter implementations for the execution backend port.

pub mod memory;
