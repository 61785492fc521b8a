//! Error types for agent directory domain validation.

use thiserror::Error;

/// Errors returned while constructing agent directory domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryDomainError {
    /// The agent identifier is empty or whitespace-only.
    #[error("agent id must not be empty")]
    EmptyAgentId,

    /// The live description template does not compile.
    #[error("invalid live description template: {0}")]
    InvalidDescriptionTemplate(String),
}
