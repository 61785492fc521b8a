//! In-memory execution backend for tests and local wiring.

mod scripted_backend;

pub use scripted_backend::{ExecutionScript, ScriptedExecutionBackend};
