//! Unified agent record.

use super::{AgentId, AgentStatus, LiveAgentPayload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Where an [`AgentRecord`] came from.
///
/// Decoded records are always primary; only the directory merge synthesizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordProvenance {
    /// Taken from the authoritative listing.
    #[default]
    Primary,
    /// Manufactured from live data because no primary record shares its id.
    Synthesized,
}

/// The unified shape every agent is normalized to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    id: AgentId,
    name: String,
    status: AgentStatus,
    description: String,
    #[serde(rename = "type")]
    agent_type: String,
    #[serde(default)]
    capabilities: Vec<String>,
    #[serde(default)]
    config: Map<String, Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip_deserializing)]
    provenance: RecordProvenance,
}

/// Parameter object for records supplied by the primary listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryAgentData {
    /// Agent identifier.
    pub id: AgentId,
    /// Display name.
    pub name: String,
    /// Agent status.
    pub status: AgentStatus,
    /// Free-text description.
    pub description: String,
    /// Classification tag.
    pub agent_type: String,
    /// Ordered capability list.
    pub capabilities: Vec<String>,
    /// Arbitrary configuration.
    pub config: Map<String, Value>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl AgentRecord {
    /// Builds a record from the authoritative listing.
    #[must_use]
    pub fn from_primary(data: PrimaryAgentData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            status: data.status,
            description: data.description,
            agent_type: data.agent_type,
            capabilities: data.capabilities,
            config: data.config,
            created_at: data.created_at,
            updated_at: data.updated_at,
            provenance: RecordProvenance::Primary,
        }
    }

    /// Builds a record from live data alone.
    ///
    /// Both timestamps are set to `reconciled_at`.
    pub(crate) fn synthesize(
        id: AgentId,
        payload: LiveAgentPayload,
        description: String,
        reconciled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: id.display_name(),
            id,
            status: AgentStatus::from(payload.status),
            description,
            agent_type: payload.agent_type,
            capabilities: payload.capabilities,
            config: Map::new(),
            created_at: reconciled_at,
            updated_at: reconciled_at,
            provenance: RecordProvenance::Synthesized,
        }
    }

    /// Returns the agent identifier.
    #[must_use]
    pub const fn id(&self) -> &AgentId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the agent status.
    #[must_use]
    pub const fn status(&self) -> &AgentStatus {
        &self.status
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the classification tag.
    #[must_use]
    pub fn agent_type(&self) -> &str {
        &self.agent_type
    }

    /// Returns the ordered capability list.
    #[must_use]
    pub fn capabilities(&self) -> &[String] {
        &self.capabilities
    }

    /// Returns the configuration map.
    #[must_use]
    pub const fn config(&self) -> &Map<String, Value> {
        &self.config
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns where the record came from.
    #[must_use]
    pub const fn provenance(&self) -> RecordProvenance {
        self.provenance
    }

    /// Returns whether the record was manufactured from live data.
    #[must_use]
    pub const fn is_synthesized(&self) -> bool {
        matches!(self.provenance, RecordProvenance::Synthesized)
    }

    /// Compares two records field by field, ignoring both timestamps.
    ///
    /// Synthesized records carry the reconciliation time, so two passes over
    /// the same inputs agree on everything except the timestamps.
    #[must_use]
    pub fn eq_ignoring_timestamps(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.status == other.status
            && self.description == other.description
            && self.agent_type == other.agent_type
            && self.capabilities == other.capabilities
            && self.config == other.config
            && self.provenance == other.provenance
    }
}
