//! Single-flight execution dispatch per agent.
//!
//! Provides [`ExecutionCoordinator`], which marks an agent pending, hands
//! the request to the backend on the tokio runtime, and releases the mark
//! only once the dispatch has settled.

use mockable::Clock;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, oneshot};

use super::ExecutionLedger;
use crate::execution::{
    domain::{
        AgentId, ExecutionDomainError, ExecutionEvent, ExecutionId, ExecutionOutcome,
        ExecutionProgress, ExecutionRequest, ExecutionState,
    },
    ports::{
        ExecutionBackend, ExecutionBackendError, ExecutionBackendResult, ProgressSink,
        ProgressStream, progress_channel,
    },
};

/// Service-level errors for execution dispatch.
#[derive(Debug, Error)]
pub enum ExecutionCoordinatorError {
    /// The agent already has an execution in flight.
    #[error("agent {0} already has an execution in flight")]
    AlreadyPending(AgentId),
    /// Domain validation or state transition failed.
    #[error(transparent)]
    Domain(#[from] ExecutionDomainError),
    /// The backend reported a failed dispatch.
    #[error(transparent)]
    Backend(#[from] ExecutionBackendError),
    /// The ledger lock was poisoned.
    #[error("execution ledger unavailable: {0}")]
    LedgerUnavailable(String),
    /// No tokio runtime is available to run the dispatch.
    #[error("no async runtime available for dispatch: {0}")]
    RuntimeUnavailable(String),
    /// The dispatch task ended without delivering an outcome.
    #[error("execution {0} ended without reporting an outcome")]
    Abandoned(ExecutionId),
}

/// Result type for execution coordinator operations.
pub type ExecutionCoordinatorResult<T> = Result<T, ExecutionCoordinatorError>;

/// Configuration for execution dispatch.
///
/// # Examples
///
/// ```
/// use marshal::execution::services::CoordinatorConfig;
///
/// let config = CoordinatorConfig::default();
/// assert!(config.complete_on_success);
///
/// let passthrough = CoordinatorConfig::passthrough();
/// assert!(!passthrough.complete_on_success);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Events buffered per state-change subscriber before it lags.
    pub event_capacity: usize,
    /// Whether a successful dispatch that never reported `1.0` gets a
    /// terminal `1.0` event appended to its progress stream.
    pub complete_on_success: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            event_capacity: 64,
            complete_on_success: true,
        }
    }
}

impl CoordinatorConfig {
    /// Creates a configuration that forwards backend progress untouched.
    #[must_use]
    pub const fn passthrough() -> Self {
        Self {
            event_capacity: 64,
            complete_on_success: false,
        }
    }
}

/// Handle returned for an accepted dispatch.
///
/// Dropping the ticket does not stop the dispatch; it only discards the
/// caller's view of progress and outcome.
#[derive(Debug)]
pub struct ExecutionTicket {
    execution_id: ExecutionId,
    agent_id: AgentId,
    progress: ProgressStream,
    outcome: oneshot::Receiver<ExecutionBackendResult<ExecutionOutcome>>,
}

impl ExecutionTicket {
    /// Returns the dispatch identifier.
    #[must_use]
    pub const fn execution_id(&self) -> ExecutionId {
        self.execution_id
    }

    /// Returns the dispatched agent.
    #[must_use]
    pub const fn agent_id(&self) -> &AgentId {
        &self.agent_id
    }

    /// Returns the progress stream of this dispatch.
    pub const fn progress(&mut self) -> &mut ProgressStream {
        &mut self.progress
    }

    /// Waits for the next progress event; `None` once the stream has ended.
    pub async fn next_progress(&mut self) -> Option<ExecutionProgress> {
        self.progress.recv().await
    }

    /// Waits for the stream to end and returns every remaining event.
    pub async fn drain_progress(&mut self) -> Vec<ExecutionProgress> {
        self.progress.collect_remaining().await
    }

    /// Waits for the dispatch to settle.
    ///
    /// By the time this returns, the agent's pending mark has already been
    /// released.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionCoordinatorError::Backend`] when the dispatch
    /// failed, or [`ExecutionCoordinatorError::Abandoned`] when the dispatch
    /// task ended without an outcome.
    pub async fn outcome(self) -> ExecutionCoordinatorResult<ExecutionOutcome> {
        match self.outcome.await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ExecutionCoordinatorError::Abandoned(self.execution_id)),
        }
    }
}

/// Dispatches executions with at most one in flight per agent.
///
/// Agents move through `Idle -> Pending -> (Succeeded | Failed)`. A request
/// for a pending agent is rejected; requests for different agents run
/// concurrently. Failures are recorded in the agent's state and returned
/// through the ticket.
pub struct ExecutionCoordinator<B, C>
where
    B: ExecutionBackend + 'static,
    C: Clock + Send + Sync + 'static,
{
    backend: Arc<B>,
    ledger: ExecutionLedger<C>,
    config: CoordinatorConfig,
}

impl<B, C> Clone for ExecutionCoordinator<B, C>
where
    B: ExecutionBackend + 'static,
    C: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            ledger: self.ledger.clone(),
            config: self.config.clone(),
        }
    }
}

impl<B, C> ExecutionCoordinator<B, C>
where
    B: ExecutionBackend + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a coordinator with the default configuration.
    #[must_use]
    pub fn new(backend: Arc<B>, clock: Arc<C>) -> Self {
        Self::with_config(backend, clock, CoordinatorConfig::default())
    }

    /// Creates a coordinator with an explicit configuration.
    #[must_use]
    pub fn with_config(backend: Arc<B>, clock: Arc<C>, config: CoordinatorConfig) -> Self {
        Self {
            backend,
            ledger: ExecutionLedger::new(clock, config.event_capacity),
            config,
        }
    }

    /// Starts a dispatch for the request's agent and returns immediately.
    ///
    /// The agent is marked pending before the backend is called. The mark is
    /// released once the backend settles, whether it succeeds, fails or
    /// panics.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionCoordinatorError::AlreadyPending`] when the agent
    /// has an execution in flight,
    /// [`ExecutionCoordinatorError::RuntimeUnavailable`] when called outside
    /// a tokio runtime, or [`ExecutionCoordinatorError::LedgerUnavailable`]
    /// when the ledger lock is poisoned.
    pub fn request_execution(
        &self,
        request: ExecutionRequest,
    ) -> ExecutionCoordinatorResult<ExecutionTicket> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|err| ExecutionCoordinatorError::RuntimeUnavailable(err.to_string()))?;
        let agent_id = request.agent_id().clone();
        let execution_id = request.id();

        if let Err(err) = self.ledger.try_begin(&agent_id, execution_id) {
            tracing::debug!(agent_id = %agent_id, error = %err, "execution request rejected");
            return Err(err);
        }
        tracing::info!(
            agent_id = %agent_id,
            execution_id = %execution_id,
            instruction = request.instruction(),
            "execution dispatched"
        );

        let (sink, progress) = progress_channel(execution_id);
        let (outcome_sender, outcome) = oneshot::channel();
        runtime.spawn(run_dispatch(Dispatch {
            backend: Arc::clone(&self.backend),
            ledger: self.ledger.clone(),
            request,
            sink,
            complete_on_success: self.config.complete_on_success,
            outcome_sender,
        }));

        Ok(ExecutionTicket {
            execution_id,
            agent_id,
            progress,
            outcome,
        })
    }

    /// Returns the execution state of an agent.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionCoordinatorError::LedgerUnavailable`] when the
    /// ledger lock is poisoned.
    pub fn state(&self, agent_id: &AgentId) -> ExecutionCoordinatorResult<ExecutionState> {
        self.ledger.state(agent_id)
    }

    /// Returns whether the agent has an execution in flight.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionCoordinatorError::LedgerUnavailable`] when the
    /// ledger lock is poisoned.
    pub fn is_pending(&self, agent_id: &AgentId) -> ExecutionCoordinatorResult<bool> {
        Ok(self.ledger.state(agent_id)?.is_pending())
    }

    /// Returns the agents with an execution in flight, sorted by id.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionCoordinatorError::LedgerUnavailable`] when the
    /// ledger lock is poisoned.
    pub fn pending(&self) -> ExecutionCoordinatorResult<Vec<AgentId>> {
        self.ledger.pending()
    }

    /// Returns every non-idle agent state, ordered by agent id.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionCoordinatorError::LedgerUnavailable`] when the
    /// ledger lock is poisoned.
    pub fn snapshot(&self) -> ExecutionCoordinatorResult<BTreeMap<AgentId, ExecutionState>> {
        self.ledger.snapshot()
    }

    /// Clears a settled result, returning the agent to idle.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionCoordinatorError::Domain`] when the agent is still
    /// pending, or [`ExecutionCoordinatorError::LedgerUnavailable`] when the
    /// ledger lock is poisoned.
    pub fn acknowledge(&self, agent_id: &AgentId) -> ExecutionCoordinatorResult<ExecutionState> {
        self.ledger.acknowledge(agent_id)
    }

    /// Subscribes to per-agent state transitions.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ExecutionEvent> {
        self.ledger.subscribe()
    }
}

struct Dispatch<B, C>
where
    B: ExecutionBackend + 'static,
    C: Clock + Send + Sync + 'static,
{
    backend: Arc<B>,
    ledger: ExecutionLedger<C>,
    request: ExecutionRequest,
    sink: ProgressSink,
    complete_on_success: bool,
    outcome_sender: oneshot::Sender<ExecutionBackendResult<ExecutionOutcome>>,
}

async fn run_dispatch<B, C>(dispatch: Dispatch<B, C>)
where
    B: ExecutionBackend + 'static,
    C: Clock + Send + Sync + 'static,
{
    let Dispatch {
        backend,
        ledger,
        request,
        sink,
        complete_on_success,
        outcome_sender,
    } = dispatch;
    let agent_id = request.agent_id().clone();
    let execution_id = request.id();

    // The backend runs in its own task so a panic still settles the agent.
    let backend_sink = sink.clone();
    let result = tokio::spawn(async move { backend.execute_agent(&request, &backend_sink).await })
        .await
        .unwrap_or_else(|join_err| Err(ExecutionBackendError::runtime(join_err)));

    if result.is_ok()
        && complete_on_success
        && let Err(err) = sink.finish()
    {
        tracing::warn!(execution_id = %execution_id, error = %err, "could not emit final progress");
    }
    if let Err(err) = sink.close() {
        tracing::warn!(execution_id = %execution_id, error = %err, "could not close progress sink");
    }
    drop(sink);

    let settlement = match &result {
        Ok(_) => Ok(()),
        Err(err) => {
            tracing::warn!(
                agent_id = %agent_id,
                execution_id = %execution_id,
                error = %err,
                "execution failed"
            );
            Err(err.to_string())
        }
    };
    match ledger.settle(&agent_id, execution_id, settlement) {
        Ok(state) => tracing::info!(
            agent_id = %agent_id,
            execution_id = %execution_id,
            phase = %state.phase(),
            "execution settled"
        ),
        Err(err) => tracing::error!(
            agent_id = %agent_id,
            execution_id = %execution_id,
            error = %err,
            "could not settle execution"
        ),
    }

    if outcome_sender.send(result).is_err() {
        tracing::debug!(execution_id = %execution_id, "execution ticket dropped before outcome");
    }
}
