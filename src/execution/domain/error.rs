//! Error types for execution domain validation.

use super::{AgentId, ExecutionId};
use thiserror::Error;

/// Errors returned while constructing or transitioning execution values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExecutionDomainError {
    /// The instruction is empty after trimming.
    #[error("execution instruction must not be empty")]
    EmptyInstruction,

    /// A progress fraction is not a finite value in `[0, 1]`.
    #[error("progress fraction must be within [0, 1], got {0}")]
    InvalidProgressFraction(String),

    /// Transitioning between two execution phases is invalid.
    #[error("invalid execution transition for agent {agent_id}: {from} -> {to}")]
    InvalidTransition {
        /// Agent whose state was being changed.
        agent_id: AgentId,
        /// Current phase.
        from: String,
        /// Requested phase.
        to: String,
    },

    /// A settle arrived for a dispatch that is not the pending one.
    #[error("agent {agent_id} is not pending execution {expected}")]
    StaleExecution {
        /// Agent whose state was being settled.
        agent_id: AgentId,
        /// Execution the settle referred to.
        expected: ExecutionId,
        /// Execution currently recorded, if any.
        actual: Option<ExecutionId>,
    },
}
