//! Execution backend that replays per-agent scripts.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::Notify;

use crate::execution::{
    domain::{AgentId, ExecutionOutcome, ExecutionProgress, ExecutionRequest},
    ports::{ExecutionBackend, ExecutionBackendError, ExecutionBackendResult, ProgressSink},
};

/// Scripted behaviour of one agent.
///
/// Steps are reported in order. A gated script then waits until
/// [`ScriptedExecutionBackend::release`] is called for the agent before
/// settling.
#[derive(Debug, Clone, Default)]
pub struct ExecutionScript {
    steps: Vec<ExecutionProgress>,
    failure: Option<String>,
    output: Option<Value>,
    gated: bool,
}

impl ExecutionScript {
    /// Creates a script that succeeds immediately without progress.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a progress step.
    #[must_use]
    pub fn with_step(mut self, step: ExecutionProgress) -> Self {
        self.steps.push(step);
        self
    }

    /// Appends several progress steps.
    #[must_use]
    pub fn with_steps(mut self, steps: impl IntoIterator<Item = ExecutionProgress>) -> Self {
        self.steps.extend(steps);
        self
    }

    /// Makes the dispatch fail with `reason` after its steps.
    #[must_use]
    pub fn failing_with(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }

    /// Sets the output returned on success.
    #[must_use]
    pub fn with_output(mut self, output: Value) -> Self {
        self.output = Some(output);
        self
    }

    /// Holds the dispatch open until it is released.
    #[must_use]
    pub const fn gated(mut self) -> Self {
        self.gated = true;
        self
    }
}

#[derive(Debug, Default)]
struct BackendState {
    scripts: HashMap<AgentId, ExecutionScript>,
    gates: HashMap<AgentId, Arc<Notify>>,
    invocations: Vec<ExecutionRequest>,
}

/// Thread-safe backend driven by [`ExecutionScript`]s.
///
/// Agents without a script succeed at once with no progress.
#[derive(Debug, Clone, Default)]
pub struct ScriptedExecutionBackend {
    state: Arc<RwLock<BackendState>>,
}

fn lock_error(err: impl ToString) -> ExecutionBackendError {
    ExecutionBackendError::runtime(std::io::Error::other(err.to_string()))
}

impl ScriptedExecutionBackend {
    /// Creates a backend with no scripts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the script used for subsequent dispatches to `agent_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionBackendError::Runtime`] when lock acquisition fails.
    pub fn script(&self, agent_id: AgentId, script: ExecutionScript) -> ExecutionBackendResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.scripts.insert(agent_id, script);
        Ok(())
    }

    /// Lets one gated dispatch of `agent_id` settle.
    ///
    /// A release issued before the dispatch reaches its gate is kept.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionBackendError::Runtime`] when lock acquisition fails.
    pub fn release(&self, agent_id: &AgentId) -> ExecutionBackendResult<()> {
        let gate = self.gate(agent_id)?;
        gate.notify_one();
        Ok(())
    }

    /// Returns every request received so far, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionBackendError::Runtime`] when lock acquisition fails.
    pub fn invocations(&self) -> ExecutionBackendResult<Vec<ExecutionRequest>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.invocations.clone())
    }

    /// Returns how many requests targeted `agent_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionBackendError::Runtime`] when lock acquisition fails.
    pub fn invocation_count(&self, agent_id: &AgentId) -> ExecutionBackendResult<usize> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .invocations
            .iter()
            .filter(|request| request.agent_id() == agent_id)
            .count())
    }

    fn gate(&self, agent_id: &AgentId) -> ExecutionBackendResult<Arc<Notify>> {
        let mut state = self.state.write().map_err(lock_error)?;
        let gate = state
            .gates
            .entry(agent_id.clone())
            .or_insert_with(|| Arc::new(Notify::new()));
        Ok(Arc::clone(gate))
    }

    fn record(&self, request: &ExecutionRequest) -> ExecutionBackendResult<ExecutionScript> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.invocations.push(request.clone());
        Ok(state
            .scripts
            .get(request.agent_id())
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl ExecutionBackend for ScriptedExecutionBackend {
    async fn execute_agent(
        &self,
        request: &ExecutionRequest,
        progress: &ProgressSink,
    ) -> ExecutionBackendResult<ExecutionOutcome> {
        let script = self.record(request)?;
        for step in script.steps {
            progress
                .report(step)
                .map_err(ExecutionBackendError::runtime)?;
        }

        if script.gated {
            let gate = self.gate(request.agent_id())?;
            tracing::debug!(agent_id = %request.agent_id(), "scripted execution waiting at gate");
            gate.notified().await;
        }

        if let Some(reason) = script.failure {
            return Err(ExecutionBackendError::rejected(
                request.agent_id().clone(),
                reason,
            ));
        }
        Ok(script
            .output
            .map_or_else(ExecutionOutcome::empty, ExecutionOutcome::with_output))
    }
}
