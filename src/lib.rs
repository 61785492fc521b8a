//! Marshal: agent directory reconciliation and execution dispatch.
//!
//! This crate builds a unified directory of AI agents from a configured
//! registry and a live telemetry feed, and dispatches "execute"
//! instructions to agents with at most one execution in flight per agent.
//!
//! # Architecture
//!
//! Marshal follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory sources and backends)
//!
//! # Modules
//!
//! - [`directory`]: Merging the primary and live agent listings
//! - [`execution`]: Single-flight execution dispatch with streamed progress

pub mod directory;
pub mod execution;
