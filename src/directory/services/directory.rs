//! Service layer combining both agent listings into a directory view.
//!
//! Provides [`AgentDirectoryService`], which fetches the primary and live
//! listings and applies the availability policy: a failed primary listing
//! produces no view at all, a failed live listing only removes the live
//! overlay.

use mockable::Clock;
use std::sync::Arc;

use super::{AgentDirectory, DirectoryConfig};
use crate::directory::{
    domain::{AgentId, AgentRecord, LiveAgentEntry},
    ports::{AgentSourceError, AgentSourceResult, LiveAgentSource, PrimaryAgentSource},
};

/// Loading state of one listing as seen by the caller.
#[derive(Debug, Clone)]
pub enum SourceState<T> {
    /// The listing has not arrived yet.
    Loading,
    /// The listing is available.
    Ready(T),
    /// The listing could not be fetched.
    Failed(AgentSourceError),
}

impl<T> From<AgentSourceResult<T>> for SourceState<T> {
    fn from(result: AgentSourceResult<T>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(err) => Self::Failed(err),
        }
    }
}

/// Contribution of the live listing to a directory view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveOverlay {
    /// Live data was merged.
    Applied,
    /// The live listing is still loading; only primary data is shown.
    Pending,
    /// The live listing failed; only primary data is shown.
    Unavailable(String),
}

/// Reconciled list of agents ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryListing {
    agents: Vec<AgentRecord>,
    live_overlay: LiveOverlay,
}

impl DirectoryListing {
    /// Returns the reconciled agents, primary records first.
    #[must_use]
    pub fn agents(&self) -> &[AgentRecord] {
        &self.agents
    }

    /// Returns how the live listing contributed.
    #[must_use]
    pub const fn live_overlay(&self) -> &LiveOverlay {
        &self.live_overlay
    }

    /// Consumes the listing and returns the agents.
    #[must_use]
    pub fn into_agents(self) -> Vec<AgentRecord> {
        self.agents
    }
}

/// What the caller should display for the agent directory.
#[derive(Debug, Clone)]
pub enum DirectoryView {
    /// The primary listing is still loading.
    Loading,
    /// The primary listing failed; no partial view is produced.
    Unavailable(AgentSourceError),
    /// The reconciled listing.
    Ready(DirectoryListing),
}

impl DirectoryView {
    /// Returns whether the view is waiting on the primary listing.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns the primary listing failure, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&AgentSourceError> {
        match self {
            Self::Unavailable(err) => Some(err),
            Self::Loading | Self::Ready(_) => None,
        }
    }

    /// Returns the reconciled agents when the view is ready.
    #[must_use]
    pub fn agents(&self) -> Option<&[AgentRecord]> {
        match self {
            Self::Ready(listing) => Some(listing.agents()),
            Self::Loading | Self::Unavailable(_) => None,
        }
    }

    /// Returns the live overlay status when the view is ready.
    #[must_use]
    pub const fn live_overlay(&self) -> Option<&LiveOverlay> {
        match self {
            Self::Ready(listing) => Some(listing.live_overlay()),
            Self::Loading | Self::Unavailable(_) => None,
        }
    }

    /// Finds an agent of a ready view by identifier.
    #[must_use]
    pub fn find(&self, id: &AgentId) -> Option<&AgentRecord> {
        self.agents()?.iter().find(|record| record.id() == id)
    }
}

/// Directory orchestration over the two listing sources.
#[derive(Clone)]
pub struct AgentDirectoryService<P, L, C>
where
    P: PrimaryAgentSource,
    L: LiveAgentSource,
    C: Clock + Send + Sync,
{
    primary: Arc<P>,
    live: Arc<L>,
    directory: AgentDirectory<C>,
}

impl<P, L, C> AgentDirectoryService<P, L, C>
where
    P: PrimaryAgentSource,
    L: LiveAgentSource,
    C: Clock + Send + Sync,
{
    /// Creates a service with the default directory configuration.
    #[must_use]
    pub fn new(primary: Arc<P>, live: Arc<L>, clock: Arc<C>) -> Self {
        Self::with_config(primary, live, clock, DirectoryConfig::default())
    }

    /// Creates a service with an explicit directory configuration.
    #[must_use]
    pub fn with_config(
        primary: Arc<P>,
        live: Arc<L>,
        clock: Arc<C>,
        config: DirectoryConfig,
    ) -> Self {
        Self {
            primary,
            live,
            directory: AgentDirectory::with_config(config, clock),
        }
    }

    /// Returns the underlying merge component.
    #[must_use]
    pub const fn directory(&self) -> &AgentDirectory<C> {
        &self.directory
    }

    /// Fetches both listings concurrently and reconciles them.
    pub async fn refresh(&self) -> DirectoryView {
        let (primary, live) =
            tokio::join!(self.primary.list_agents(), self.live.list_live_agents());
        self.reconcile(primary.into(), live.into())
    }

    /// Builds a view from the current state of both listings.
    ///
    /// Nothing is merged until the primary listing is ready. A live listing
    /// that is loading or failed degrades the view to primary data only.
    #[must_use]
    pub fn reconcile(
        &self,
        primary: SourceState<Vec<AgentRecord>>,
        live: SourceState<Vec<LiveAgentEntry>>,
    ) -> DirectoryView {
        let primary_agents = match primary {
            SourceState::Loading => return DirectoryView::Loading,
            SourceState::Failed(err) => {
                tracing::warn!(error = %err, "primary agent listing failed, no directory view");
                return DirectoryView::Unavailable(err);
            }
            SourceState::Ready(agents) => agents,
        };

        let (live_entries, live_overlay) = match live {
            SourceState::Ready(entries) => (entries, LiveOverlay::Applied),
            SourceState::Loading => (Vec::new(), LiveOverlay::Pending),
            SourceState::Failed(err) => {
                tracing::warn!(error = %err, "live agent listing failed, showing primary data only");
                (Vec::new(), LiveOverlay::Unavailable(err.to_string()))
            }
        };

        DirectoryView::Ready(DirectoryListing {
            agents: self.directory.merge(primary_agents, live_entries),
            live_overlay,
        })
    }
}
