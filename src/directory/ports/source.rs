//! Source ports supplying the primary and live agent listings.

use crate::directory::domain::{AgentRecord, LiveAgentEntry};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for agent listing fetches.
pub type AgentSourceResult<T> = Result<T, AgentSourceError>;

/// Authoritative listing of configured agents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PrimaryAgentSource: Send + Sync {
    /// Fetches every configured agent, in display order.
    ///
    /// # Errors
    ///
    /// Returns [`AgentSourceError`] when the listing cannot be fetched. The
    /// directory then refuses to build a view.
    async fn list_agents(&self) -> AgentSourceResult<Vec<AgentRecord>>;
}

/// Supplementary listing reporting real-time agent status.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LiveAgentSource: Send + Sync {
    /// Fetches the live listing. Entries may lack a payload.
    ///
    /// # Errors
    ///
    /// Returns [`AgentSourceError`] when the listing cannot be fetched. The
    /// directory then falls back to primary data only.
    async fn list_live_agents(&self) -> AgentSourceResult<Vec<LiveAgentEntry>>;
}

/// Errors returned by agent listing sources.
#[derive(Debug, Clone, Error)]
pub enum AgentSourceError {
    /// The source reported itself unavailable.
    #[error("agent source unavailable: {0}")]
    Unavailable(String),

    /// Transport-layer failure.
    #[error("agent source transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl AgentSourceError {
    /// Creates an unavailability error with a reason.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
