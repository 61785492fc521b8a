//! Agent status as reported by either listing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of an agent.
///
/// The primary listing uses the three known values. The live listing has a
/// richer vocabulary (`busy`, `idle`, ...) which is kept verbatim in
/// [`AgentStatus::Reported`] rather than folded into the known set.
///
/// Build statuses from text with [`From`], which maps the known values to
/// their variants. A hand-built `Reported("active")` is not equal to
/// [`AgentStatus::Active`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AgentStatus {
    /// The agent is configured and available.
    Active,
    /// The agent is configured but switched off.
    Inactive,
    /// The agent is in an error state.
    Error,
    /// Any other status string, passed through unchanged.
    Reported(String),
}

impl AgentStatus {
    /// Returns the status text exactly as it was received.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Error => "error",
            Self::Reported(raw) => raw,
        }
    }

    /// Returns whether the status is one of the three known values.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Reported(_))
    }
}

impl From<&str> for AgentStatus {
    fn from(value: &str) -> Self {
        Self::from(value.to_owned())
    }
}

impl From<String> for AgentStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "active" => Self::Active,
            "inactive" => Self::Inactive,
            "error" => Self::Error,
            _ => Self::Reported(value),
        }
    }
}

impl From<AgentStatus> for String {
    fn from(value: AgentStatus) -> Self {
        match value {
            AgentStatus::Reported(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
