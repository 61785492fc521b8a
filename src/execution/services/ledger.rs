//! Per-agent execution state ledger.

use mockable::Clock;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;

use super::{ExecutionCoordinatorError, ExecutionCoordinatorResult};
use crate::execution::domain::{
    AgentId, ExecutionDomainError, ExecutionEvent, ExecutionId, ExecutionPhase, ExecutionState,
};

type StateMap = HashMap<AgentId, ExecutionState>;

/// Mapping from agent id to its execution state.
///
/// Every mutation happens under one lock acquisition with no suspension
/// point in between, so check-then-mark is atomic. Agents missing from the
/// map are idle. Each transition is broadcast as an [`ExecutionEvent`].
#[derive(Debug)]
pub struct ExecutionLedger<C>
where
    C: Clock + Send + Sync,
{
    states: Arc<Mutex<StateMap>>,
    events: broadcast::Sender<ExecutionEvent>,
    clock: Arc<C>,
}

impl<C> Clone for ExecutionLedger<C>
where
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            states: Arc::clone(&self.states),
            events: self.events.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C> ExecutionLedger<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an empty ledger whose event channel buffers up to
    /// `event_capacity` events per subscriber (at least one).
    #[must_use]
    pub fn new(clock: Arc<C>, event_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        Self {
            states: Arc::new(Mutex::new(HashMap::new())),
            events,
            clock,
        }
    }

    /// Marks an agent pending unless it already is.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionCoordinatorError::AlreadyPending`] when the agent
    /// has an execution in flight, or
    /// [`ExecutionCoordinatorError::LedgerUnavailable`] when the lock is
    /// poisoned.
    pub fn try_begin(
        &self,
        agent_id: &AgentId,
        execution_id: ExecutionId,
    ) -> ExecutionCoordinatorResult<()> {
        let mut states = self.lock()?;
        if states.get(agent_id).is_some_and(ExecutionState::is_pending) {
            return Err(ExecutionCoordinatorError::AlreadyPending(agent_id.clone()));
        }
        self.transition(
            &mut states,
            agent_id,
            ExecutionState::Pending { execution_id },
        )?;
        Ok(())
    }

    /// Records the settled result of a pending execution.
    ///
    /// `Err` carries the failure description shown for the agent.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionDomainError::StaleExecution`] (wrapped) when the
    /// agent is not pending `execution_id`, or
    /// [`ExecutionCoordinatorError::LedgerUnavailable`] when the lock is
    /// poisoned.
    pub fn settle(
        &self,
        agent_id: &AgentId,
        execution_id: ExecutionId,
        result: Result<(), String>,
    ) -> ExecutionCoordinatorResult<ExecutionState> {
        let mut states = self.lock()?;
        let current = states.get(agent_id);
        let is_current_dispatch = matches!(
            current,
            Some(ExecutionState::Pending { execution_id: pending }) if *pending == execution_id
        );
        if !is_current_dispatch {
            return Err(ExecutionDomainError::StaleExecution {
                agent_id: agent_id.clone(),
                expected: execution_id,
                actual: current.and_then(ExecutionState::execution_id),
            }
            .into());
        }
        let settled = match result {
            Ok(()) => ExecutionState::Succeeded { execution_id },
            Err(reason) => ExecutionState::Failed {
                execution_id,
                reason,
            },
        };
        self.transition(&mut states, agent_id, settled)
    }

    /// Clears a settled result, returning the agent to idle.
    ///
    /// Acknowledging an idle agent does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionDomainError::InvalidTransition`] (wrapped) when the
    /// agent is pending, or [`ExecutionCoordinatorError::LedgerUnavailable`]
    /// when the lock is poisoned.
    pub fn acknowledge(&self, agent_id: &AgentId) -> ExecutionCoordinatorResult<ExecutionState> {
        let mut states = self.lock()?;
        if !states.contains_key(agent_id) {
            return Ok(ExecutionState::Idle);
        }
        self.transition(&mut states, agent_id, ExecutionState::Idle)
    }

    /// Returns the state of an agent.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionCoordinatorError::LedgerUnavailable`] when the lock
    /// is poisoned.
    pub fn state(&self, agent_id: &AgentId) -> ExecutionCoordinatorResult<ExecutionState> {
        let states = self.lock()?;
        Ok(states.get(agent_id).cloned().unwrap_or_default())
    }

    /// Returns the agents with an execution in flight, sorted by id.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionCoordinatorError::LedgerUnavailable`] when the lock
    /// is poisoned.
    pub fn pending(&self) -> ExecutionCoordinatorResult<Vec<AgentId>> {
        let states = self.lock()?;
        let mut pending: Vec<AgentId> = states
            .iter()
            .filter(|(_, state)| state.is_pending())
            .map(|(agent_id, _)| agent_id.clone())
            .collect();
        pending.sort();
        Ok(pending)
    }

    /// Returns every non-idle agent state, ordered by agent id.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionCoordinatorError::LedgerUnavailable`] when the lock
    /// is poisoned.
    pub fn snapshot(&self) -> ExecutionCoordinatorResult<BTreeMap<AgentId, ExecutionState>> {
        let states = self.lock()?;
        Ok(states
            .iter()
            .map(|(agent_id, state)| (agent_id.clone(), state.clone()))
            .collect())
    }

    /// Subscribes to state transitions published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ExecutionEvent> {
        self.events.subscribe()
    }

    fn transition(
        &self,
        states: &mut MutexGuard<'_, StateMap>,
        agent_id: &AgentId,
        next: ExecutionState,
    ) -> ExecutionCoordinatorResult<ExecutionState> {
        let from = states
            .get(agent_id)
            .map_or(ExecutionPhase::Idle, ExecutionState::phase);
        let to = next.phase();
        if !from.can_transition_to(to) {
            return Err(ExecutionDomainError::InvalidTransition {
                agent_id: agent_id.clone(),
                from: from.as_str().to_owned(),
                to: to.as_str().to_owned(),
            }
            .into());
        }

        if matches!(next, ExecutionState::Idle) {
            states.remove(agent_id);
        } else {
            states.insert(agent_id.clone(), next.clone());
        }

        let event = ExecutionEvent {
            agent_id: agent_id.clone(),
            state: next.clone(),
            occurred_at: self.clock.utc(),
        };
        if self.events.send(event).is_err() {
            tracing::trace!(agent_id = %agent_id, "no execution event subscribers");
        }
        Ok(next)
    }

    fn lock(&self) -> ExecutionCoordinatorResult<MutexGuard<'_, StateMap>> {
        self.states
            .lock()
            .map_err(|err| ExecutionCoordinatorError::LedgerUnavailable(err.to_string()))
    }
}
