//! Per-agent execution state machine.

use super::ExecutionId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag of an [`ExecutionState`], used to validate transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionPhase {
    /// No dispatch has been issued, or the last result was acknowledged.
    Idle,
    /// A dispatch is in flight.
    Pending,
    /// The last dispatch succeeded.
    Succeeded,
    /// The last dispatch failed.
    Failed,
}

impl ExecutionPhase {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending => "pending",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    /// Returns whether transition to `target` is allowed.
    ///
    /// A settled agent may start a new dispatch directly; acknowledging the
    /// result first is optional.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Idle, Self::Pending)
                | (Self::Pending, Self::Succeeded | Self::Failed)
                | (Self::Succeeded | Self::Failed, Self::Idle | Self::Pending)
        )
    }
}

impl fmt::Display for ExecutionPhase {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Execution state of one agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum ExecutionState {
    /// Nothing in flight.
    #[default]
    Idle,
    /// A dispatch is in flight.
    Pending {
        /// The in-flight dispatch.
        execution_id: ExecutionId,
    },
    /// The last dispatch succeeded.
    Succeeded {
        /// The settled dispatch.
        execution_id: ExecutionId,
    },
    /// The last dispatch failed.
    Failed {
        /// The settled dispatch.
        execution_id: ExecutionId,
        /// Failure description for display.
        reason: String,
    },
}

impl ExecutionState {
    /// Returns the phase tag of this state.
    #[must_use]
    pub const fn phase(&self) -> ExecutionPhase {
        match self {
            Self::Idle => ExecutionPhase::Idle,
            Self::Pending { .. } => ExecutionPhase::Pending,
            Self::Succeeded { .. } => ExecutionPhase::Succeeded,
            Self::Failed { .. } => ExecutionPhase::Failed,
        }
    }

    /// Returns whether a dispatch is in flight.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    /// Returns the dispatch this state refers to, if any.
    #[must_use]
    pub const fn execution_id(&self) -> Option<ExecutionId> {
        match self {
            Self::Idle => None,
            Self::Pending { execution_id }
            | Self::Succeeded { execution_id }
            | Self::Failed { execution_id, .. } => Some(*execution_id),
        }
    }

    /// Returns the failure reason of a failed dispatch.
    #[must_use]
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Failed { reason, .. } => Some(reason),
            Self::Idle | Self::Pending { .. } | Self::Succeeded { .. } => None,
        }
    }
}
