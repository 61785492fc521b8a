//! Execution request handed to the backend.

use super::{AgentId, ExecutionDomainError, ExecutionId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Instruction to execute one agent.
///
/// A request lives only for the duration of its dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRequest")]
pub struct ExecutionRequest {
    id: ExecutionId,
    agent_id: AgentId,
    instruction: String,
    parameters: Map<String, Value>,
}

#[derive(Deserialize)]
struct RawRequest {
    id: ExecutionId,
    agent_id: AgentId,
    instruction: String,
    #[serde(default)]
    parameters: Map<String, Value>,
}

impl TryFrom<RawRequest> for ExecutionRequest {
    type Error = ExecutionDomainError;

    fn try_from(raw: RawRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            id: raw.id,
            agent_id: raw.agent_id,
            instruction: normalize_instruction(&raw.instruction)?,
            parameters: raw.parameters,
        })
    }
}

fn normalize_instruction(raw: &str) -> Result<String, ExecutionDomainError> {
    let instruction = raw.trim();
    if instruction.is_empty() {
        return Err(ExecutionDomainError::EmptyInstruction);
    }
    Ok(instruction.to_owned())
}

impl ExecutionRequest {
    /// Creates a request with no parameters.
    ///
    /// The instruction is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionDomainError::EmptyInstruction`] when the
    /// instruction is blank.
    pub fn new(
        agent_id: AgentId,
        raw_instruction: impl Into<String>,
    ) -> Result<Self, ExecutionDomainError> {
        Ok(Self {
            id: ExecutionId::new(),
            agent_id,
            instruction: normalize_instruction(&raw_instruction.into())?,
            parameters: Map::new(),
        })
    }

    /// Sets the instruction parameters.
    #[must_use]
    pub fn with_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Adds a single parameter.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    /// Returns the dispatch identifier.
    #[must_use]
    pub const fn id(&self) -> ExecutionId {
        self.id
    }

    /// Returns the target agent.
    #[must_use]
    pub const fn agent_id(&self) -> &AgentId {
        &self.agent_id
    }

    /// Returns the instruction.
    #[must_use]
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Returns the instruction parameters.
    #[must_use]
    pub const fn parameters(&self) -> &Map<String, Value> {
        &self.parameters
    }
}
