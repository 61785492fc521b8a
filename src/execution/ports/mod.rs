//! Port contracts for the execution backend.
//!
//! The backend receives a [`ProgressSink`] for each dispatch; the caller
//! reads the matching [`ProgressStream`].

pub mod backend;
pub mod progress;

pub use backend::{ExecutionBackend, ExecutionBackendError, ExecutionBackendResult};
#[cfg(test)]
pub use backend::MockExecutionBackend;
pub use progress::{ProgressSink, ProgressSinkError, ProgressStream, progress_channel};
