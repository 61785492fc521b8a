//! In-memory integration tests for the agent directory.

use super::helpers::{agent, directory_harness, live_entry, primary_record};
use marshal::directory::{
    adapters::memory::{InMemoryLiveSource, InMemoryPrimarySource},
    domain::{AgentStatus, LiveAgentEntry, RecordProvenance},
    ports::AgentSourceError,
    services::{AgentDirectoryService, DirectoryConfig, LiveOverlay},
};
use mockable::DefaultClock;
use rstest::rstest;
use serde_json::json;
use std::sync::Arc;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refresh_lists_primary_agents_then_live_only_agents() {
    let harness = directory_harness(
        vec![
            primary_record("planner", "Planner"),
            primary_record("coder", "Coder"),
        ],
        vec![
            live_entry("coder", "busy", 9),
            live_entry("scout", "idle", 1),
            LiveAgentEntry::empty(),
        ],
    );

    let view = harness.service.refresh().await;

    let agents = view.agents().expect("directory should be ready");
    let ids: Vec<&str> = agents.iter().map(|record| record.id().as_str()).collect();
    assert_eq!(ids, vec!["planner", "coder", "scout"]);

    let coder = view.find(&agent("coder")).expect("coder listed");
    assert_eq!(coder.status(), &AgentStatus::Active);
    assert_eq!(coder.provenance(), RecordProvenance::Primary);

    let scout = view.find(&agent("scout")).expect("scout listed");
    assert_eq!(scout.name(), "Scout");
    assert_eq!(scout.status().as_str(), "idle");
    assert_eq!(scout.description(), "Live agent reporting load 1");
    assert!(scout.is_synthesized());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn live_outage_and_recovery_change_only_the_overlay() {
    let harness = directory_harness(
        vec![primary_record("planner", "Planner")],
        vec![live_entry("scout", "idle", 1)],
    );
    harness
        .live
        .fail_with("telemetry timeout")
        .expect("inject live failure");

    let degraded = harness.service.refresh().await;

    assert_eq!(degraded.agents().map(<[_]>::len), Some(1));
    assert!(matches!(
        degraded.live_overlay(),
        Some(LiveOverlay::Unavailable(reason)) if reason.contains("telemetry timeout")
    ));

    harness.live.recover().expect("clear live failure");
    let recovered = harness.service.refresh().await;

    assert_eq!(recovered.agents().map(<[_]>::len), Some(2));
    assert_eq!(recovered.live_overlay(), Some(&LiveOverlay::Applied));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn primary_outage_yields_no_directory() {
    let harness = directory_harness(Vec::new(), vec![live_entry("scout", "idle", 1)]);
    harness
        .primary
        .fail_with("registry offline")
        .expect("inject primary failure");

    let view = harness.service.refresh().await;

    assert!(view.agents().is_none());
    assert!(matches!(
        view.error(),
        Some(AgentSourceError::Unavailable(reason)) if reason == "registry offline"
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn replaced_listings_are_picked_up_on_refresh() {
    let harness = directory_harness(vec![primary_record("planner", "Planner")], Vec::new());

    harness
        .primary
        .replace(vec![primary_record("reviewer", "Reviewer")])
        .expect("replace primary");
    harness
        .live
        .replace(vec![live_entry("reviewer", "busy", 2)])
        .expect("replace live");
    let view = harness.service.refresh().await;

    let agents = view.agents().expect("directory should be ready");
    assert_eq!(agents.len(), 1);
    assert_eq!(
        agents.first().map(|record| record.name()),
        Some("Reviewer")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn raw_live_payloads_are_decoded_leniently() {
    let entries = vec![
        LiveAgentEntry::from_value(json!({
            "content": {"id": "scout", "status": "idle", "type": "crawler", "capabilities": ["fetch"]}
        })),
        LiveAgentEntry::from_value(json!({"content": null})),
        LiveAgentEntry::from_value(json!({"content": {"status": "missing id"}})),
        LiveAgentEntry::from_value(json!("not an object")),
        LiveAgentEntry::from_value(json!({"content": {"id": "   ", "status": "idle"}})),
    ];
    let harness = directory_harness(Vec::new(), entries);

    let view = harness.service.refresh().await;

    let agents = view.agents().expect("directory should be ready");
    assert_eq!(agents.len(), 1);
    let scout = agents.first().expect("scout listed");
    assert_eq!(scout.agent_type(), "crawler");
    assert_eq!(scout.capabilities(), ["fetch".to_owned()]);
    assert_eq!(scout.description(), "Live agent reporting load unknown");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn custom_description_template_is_rendered() {
    let config = DirectoryConfig::with_live_description_template(
        "{{ type }} {{ id }} is {{ status }} at load {{ load }}",
    )
    .expect("template compiles");
    let service = AgentDirectoryService::with_config(
        Arc::new(InMemoryPrimarySource::new()),
        Arc::new(InMemoryLiveSource::with_entries(vec![live_entry(
            "scout", "idle", 4,
        )])),
        Arc::new(DefaultClock),
        config,
    );

    let view = service.refresh().await;

    let scout = view.find(&agent("scout")).expect("scout listed");
    assert_eq!(scout.description(), "worker scout is idle at load 4");
}
