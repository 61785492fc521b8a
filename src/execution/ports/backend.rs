//! Backend port that runs agent executions.

use crate::execution::{
    domain::{AgentId, ExecutionOutcome, ExecutionRequest},
    ports::ProgressSink,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for backend dispatches.
pub type ExecutionBackendResult<T> = Result<T, ExecutionBackendError>;

/// Live backend that executes agents and streams progress.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Executes the request, reporting progress through `progress` zero or
    /// more times before returning.
    ///
    /// There is no cancellation: once called, the dispatch runs until it
    /// succeeds or fails.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionBackendError`] when the execution fails.
    async fn execute_agent(
        &self,
        request: &ExecutionRequest,
        progress: &ProgressSink,
    ) -> ExecutionBackendResult<ExecutionOutcome>;
}

/// Errors returned by execution backends.
#[derive(Debug, Clone, Error)]
pub enum ExecutionBackendError {
    /// The agent refused or failed the instruction.
    #[error("agent {agent_id} failed execution: {reason}")]
    Rejected {
        /// Agent that failed.
        agent_id: AgentId,
        /// Failure description.
        reason: String,
    },

    /// Generic runtime failure.
    #[error("execution backend runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl ExecutionBackendError {
    /// Creates a rejection for an agent.
    pub fn rejected(agent_id: AgentId, reason: impl Into<String>) -> Self {
        Self::Rejected {
            agent_id,
            reason: reason.into(),
        }
    }

    /// Wraps a runtime error from the backend.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}
