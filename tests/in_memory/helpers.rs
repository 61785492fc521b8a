//! Shared test helpers for in-memory integration tests.

use chrono::{TimeZone, Utc};
use marshal::directory::{
    adapters::memory::{InMemoryLiveSource, InMemoryPrimarySource},
    domain::{
        AgentId, AgentRecord, AgentStatus, LiveAgentEntry, LiveAgentPayload, PrimaryAgentData,
    },
    services::AgentDirectoryService,
};
use mockable::DefaultClock;
use serde_json::Map;
use std::sync::Arc;

/// Directory service over in-memory sources.
pub type TestDirectoryService =
    AgentDirectoryService<InMemoryPrimarySource, InMemoryLiveSource, DefaultClock>;

/// Both in-memory sources plus a service reading from them.
pub struct DirectoryHarness {
    /// Primary listing served to the service.
    pub primary: Arc<InMemoryPrimarySource>,
    /// Live listing served to the service.
    pub live: Arc<InMemoryLiveSource>,
    /// The service under test.
    pub service: TestDirectoryService,
}

/// Builds a harness with the default directory configuration.
#[must_use]
pub fn directory_harness(
    primary_agents: Vec<AgentRecord>,
    live_entries: Vec<LiveAgentEntry>,
) -> DirectoryHarness {
    let primary = Arc::new(InMemoryPrimarySource::with_agents(primary_agents));
    let live = Arc::new(InMemoryLiveSource::with_entries(live_entries));
    let service = AgentDirectoryService::new(
        Arc::clone(&primary),
        Arc::clone(&live),
        Arc::new(DefaultClock),
    );
    DirectoryHarness {
        primary,
        live,
        service,
    }
}

/// Parses an agent id.
///
/// # Panics
///
/// Panics when the id is blank.
#[must_use]
pub fn agent(id: &str) -> AgentId {
    AgentId::new(id).expect("valid agent id")
}

/// Builds a configured agent with a fixed timestamp.
///
/// # Panics
///
/// Panics when the id is blank.
#[must_use]
pub fn primary_record(id: &str, name: &str) -> AgentRecord {
    let timestamp = Utc
        .with_ymd_and_hms(2024, 6, 1, 9, 30, 0)
        .single()
        .expect("valid fixed timestamp");
    AgentRecord::from_primary(PrimaryAgentData {
        id: agent(id),
        name: name.to_owned(),
        status: AgentStatus::Active,
        description: format!("{name} from the registry"),
        agent_type: "assistant".to_owned(),
        capabilities: vec!["chat".to_owned(), "search".to_owned()],
        config: Map::new(),
        created_at: timestamp,
        updated_at: timestamp,
    })
}

/// Builds a live entry reporting a load.
#[must_use]
pub fn live_entry(id: &str, status: &str, load: u64) -> LiveAgentEntry {
    LiveAgentEntry::with_content(
        LiveAgentPayload::new(id, status)
            .with_load(load)
            .with_type("worker"),
    )
}
