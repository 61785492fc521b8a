//! In-memory primary and live agent sources.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::directory::{
    domain::{AgentRecord, LiveAgentEntry},
    ports::{AgentSourceError, AgentSourceResult, LiveAgentSource, PrimaryAgentSource},
};

#[derive(Debug)]
struct ListingState<T> {
    entries: Vec<T>,
    failure: Option<String>,
}

impl<T> Default for ListingState<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            failure: None,
        }
    }
}

fn lock_error(err: impl ToString) -> AgentSourceError {
    AgentSourceError::transport(std::io::Error::other(err.to_string()))
}

fn read_listing<T: Clone>(state: &RwLock<ListingState<T>>) -> AgentSourceResult<Vec<T>> {
    let guard = state.read().map_err(lock_error)?;
    if let Some(reason) = &guard.failure {
        return Err(AgentSourceError::unavailable(reason.clone()));
    }
    Ok(guard.entries.clone())
}

fn replace_listing<T>(state: &RwLock<ListingState<T>>, entries: Vec<T>) -> AgentSourceResult<()> {
    let mut guard = state.write().map_err(lock_error)?;
    guard.entries = entries;
    Ok(())
}

fn set_failure<T>(state: &RwLock<ListingState<T>>, failure: Option<String>) -> AgentSourceResult<()> {
    let mut guard = state.write().map_err(lock_error)?;
    guard.failure = failure;
    Ok(())
}

/// Thread-safe in-memory primary listing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPrimarySource {
    state: Arc<RwLock<ListingState<AgentRecord>>>,
}

impl InMemoryPrimarySource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source serving the given records.
    #[must_use]
    pub fn with_agents(agents: Vec<AgentRecord>) -> Self {
        Self {
            state: Arc::new(RwLock::new(ListingState {
                entries: agents,
                failure: None,
            })),
        }
    }

    /// Replaces the served records.
    ///
    /// # Errors
    ///
    /// Returns [`AgentSourceError::Transport`] when lock acquisition fails.
    pub fn replace(&self, agents: Vec<AgentRecord>) -> AgentSourceResult<()> {
        replace_listing(&self.state, agents)
    }

    /// Makes subsequent fetches fail with the given reason.
    ///
    /// # Errors
    ///
    /// Returns [`AgentSourceError::Transport`] when lock acquisition fails.
    pub fn fail_with(&self, reason: impl Into<String>) -> AgentSourceResult<()> {
        set_failure(&self.state, Some(reason.into()))
    }

    /// Clears an injected failure.
    ///
    /// # Errors
    ///
    /// Returns [`AgentSourceError::Transport`] when lock acquisition fails.
    pub fn recover(&self) -> AgentSourceResult<()> {
        set_failure(&self.state, None)
    }
}

#[async_trait]
impl PrimaryAgentSource for InMemoryPrimarySource {
    async fn list_agents(&self) -> AgentSourceResult<Vec<AgentRecord>> {
        read_listing(&self.state)
    }
}

/// Thread-safe in-memory live listing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLiveSource {
    state: Arc<RwLock<ListingState<LiveAgentEntry>>>,
}

impl InMemoryLiveSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source serving the given entries.
    #[must_use]
    pub fn with_entries(entries: Vec<LiveAgentEntry>) -> Self {
        Self {
            state: Arc::new(RwLock::new(ListingState {
                entries,
                failure: None,
            })),
        }
    }

    /// Replaces the served entries.
    ///
    /// # Errors
    ///
    /// Returns [`AgentSourceError::Transport`] when lock acquisition fails.
    pub fn replace(&self, entries: Vec<LiveAgentEntry>) -> AgentSourceResult<()> {
        replace_listing(&self.state, entries)
    }

    /// Makes subsequent fetches fail with the given reason.
    ///
    /// # Errors
    ///
    /// Returns [`AgentSourceError::Transport`] when lock acquisition fails.
    pub fn fail_with(&self, reason: impl Into<String>) -> AgentSourceResult<()> {
        set_failure(&self.state, Some(reason.into()))
    }

    /// Clears an injected failure.
    ///
    /// # Errors
    ///
    /// Returns [`AgentSourceError::Transport`] when lock acquisition fails.
    pub fn recover(&self) -> AgentSourceResult<()> {
        set_failure(&self.state, None)
    }
}

#[async_trait]
impl LiveAgentSource for InMemoryLiveSource {
    async fn list_live_agents(&self) -> AgentSourceResult<Vec<LiveAgentEntry>> {
        read_listing(&self.state)
    }
}
