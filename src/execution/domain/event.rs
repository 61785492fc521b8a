//! State change notifications published by the execution ledger.

use super::{AgentId, ExecutionState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An agent entered a new execution state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionEvent {
    /// Agent whose state changed.
    pub agent_id: AgentId,
    /// State the agent entered.
    pub state: ExecutionState,
    /// When the transition happened.
    pub occurred_at: DateTime<Utc>,
}
