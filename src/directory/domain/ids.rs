//! Identifier type shared by both agent listings.

use super::DirectoryDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an agent, shared by the primary and live listings.
///
/// The value is kept verbatim: two listings refer to the same agent only
/// when their ids are byte-for-byte equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AgentId(String);

impl AgentId {
    /// Creates an agent identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryDomainError::EmptyAgentId`] when the value is empty
    /// or contains only whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, DirectoryDomainError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(DirectoryDomainError::EmptyAgentId);
        }
        Ok(Self(raw))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the identifier with its first character upper-cased.
    ///
    /// Used as the display name of agents that only the live listing knows
    /// about (`b2` becomes `B2`, `scout` becomes `Scout`).
    #[must_use]
    pub fn display_name(&self) -> String {
        let mut chars = self.0.chars();
        chars.next().map_or_else(String::new, |first| {
            first.to_uppercase().chain(chars).collect()
        })
    }
}

impl TryFrom<String> for AgentId {
    type Error = DirectoryDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AgentId> for String {
    fn from(value: AgentId) -> Self {
        value.0
    }
}

impl AsRef<str> for AgentId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
