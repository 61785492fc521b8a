//! Entries of the live (telemetry) agent listing.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Real-time data the live listing reports for one agent.
///
/// Only `id` and `status` are required; the remaining fields default when
/// the live source omits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveAgentPayload {
    /// Agent identifier, in the same id space as the primary listing.
    pub id: String,
    /// Status string, passed through verbatim.
    pub status: String,
    /// Current load metric, if reported.
    #[serde(default)]
    pub load: Option<Number>,
    /// Classification tag.
    #[serde(rename = "type", default)]
    pub agent_type: String,
    /// Declared capabilities.
    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl LiveAgentPayload {
    /// Creates a payload with the two required fields.
    #[must_use]
    pub fn new(id: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: status.into(),
            load: None,
            agent_type: String::new(),
            capabilities: Vec::new(),
        }
    }

    /// Sets the load metric.
    #[must_use]
    pub fn with_load(mut self, load: impl Into<Number>) -> Self {
        self.load = Some(load.into());
        self
    }

    /// Sets the classification tag.
    #[must_use]
    pub fn with_type(mut self, agent_type: impl Into<String>) -> Self {
        self.agent_type = agent_type.into();
        self
    }

    /// Sets the declared capabilities.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: impl IntoIterator<Item = String>) -> Self {
        self.capabilities = capabilities.into_iter().collect();
        self
    }
}

/// One entry of the live listing.
///
/// Live sources may publish entries without a payload; such entries are
/// skipped during reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveAgentEntry {
    /// Reported payload, absent for malformed entries.
    #[serde(default)]
    pub content: Option<LiveAgentPayload>,
}

impl LiveAgentEntry {
    /// Wraps a payload into an entry.
    #[must_use]
    pub const fn with_content(payload: LiveAgentPayload) -> Self {
        Self {
            content: Some(payload),
        }
    }

    /// Creates an entry without payload.
    #[must_use]
    pub const fn empty() -> Self {
        Self { content: None }
    }

    /// Decodes a raw listing entry.
    ///
    /// A `content` member that is missing, `null`, or does not decode into a
    /// [`LiveAgentPayload`] yields an entry without payload. Decoding never
    /// fails.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            tracing::debug!("live listing entry is not an object, treating as empty");
            return Self::empty();
        };
        let Some(raw_content) = fields.remove("content") else {
            return Self::empty();
        };
        if raw_content.is_null() {
            return Self::empty();
        }
        match serde_json::from_value(raw_content) {
            Ok(payload) => Self::with_content(payload),
            Err(err) => {
                tracing::debug!(error = %err, "live listing entry content does not decode");
                Self::empty()
            }
        }
    }

    /// Returns the payload, if present.
    #[must_use]
    pub const fn content(&self) -> Option<&LiveAgentPayload> {
        self.content.as_ref()
    }

    /// Consumes the entry and returns its payload, if present.
    #[must_use]
    pub fn into_content(self) -> Option<LiveAgentPayload> {
        self.content
    }
}
