//! Port contracts for the two agent listings.
//!
//! Transport implementations live outside this crate; the directory only
//! depends on the shapes defined here.

pub mod source;

pub use source::{AgentSourceError, AgentSourceResult, LiveAgentSource, PrimaryAgentSource};

#[cfg(test)]
pub use source::{MockLiveAgentSource, MockPrimaryAgentSource};
