//! Domain model for the unified agent directory.
//!
//! Agents arrive from two differently-shaped listings: the authoritative
//! primary listing and the live telemetry listing. Both are normalized to
//! [`AgentRecord`], which remembers where it came from.

mod error;
mod ids;
mod live;
mod record;
mod status;

pub use error::DirectoryDomainError;
pub use ids::AgentId;
pub use live::{LiveAgentEntry, LiveAgentPayload};
pub use record::{AgentRecord, PrimaryAgentData, RecordProvenance};
pub use status::AgentStatus;
