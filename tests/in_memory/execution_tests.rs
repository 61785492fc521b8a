//! In-memory integration tests for execution dispatch.

use super::helpers::{agent, directory_harness, live_entry, primary_record};
use marshal::execution::{
    adapters::memory::{ExecutionScript, ScriptedExecutionBackend},
    domain::{ExecutionPhase, ExecutionProgress, ExecutionRequest, ExecutionState},
    services::{ExecutionCoordinator, ExecutionCoordinatorError},
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::json;
use std::sync::Arc;

type TestCoordinator = ExecutionCoordinator<ScriptedExecutionBackend, DefaultClock>;

#[fixture]
fn backend() -> Arc<ScriptedExecutionBackend> {
    Arc::new(ScriptedExecutionBackend::new())
}

fn coordinator(backend: &Arc<ScriptedExecutionBackend>) -> TestCoordinator {
    ExecutionCoordinator::new(Arc::clone(backend), Arc::new(DefaultClock))
}

fn step(fraction: f64, message: &str) -> ExecutionProgress {
    ExecutionProgress::new(fraction)
        .expect("valid fraction")
        .with_message(message)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn every_listed_agent_can_be_dispatched(backend: Arc<ScriptedExecutionBackend>) {
    let harness = directory_harness(
        vec![primary_record("planner", "Planner")],
        vec![live_entry("scout", "idle", 1)],
    );
    let view = harness.service.refresh().await;
    let agents = view.agents().expect("directory should be ready");
    let service = coordinator(&backend);

    let mut tickets = Vec::new();
    for record in agents {
        let request = ExecutionRequest::new(record.id().clone(), "daily summary")
            .expect("valid request");
        tickets.push(service.request_execution(request).expect("dispatch accepted"));
    }
    for ticket in tickets {
        ticket.outcome().await.expect("dispatch succeeds");
    }

    let snapshot = service.snapshot().expect("snapshot readable");
    assert_eq!(snapshot.len(), 2);
    assert!(
        snapshot
            .values()
            .all(|state| state.phase() == ExecutionPhase::Succeeded)
    );
    let invocations = backend.invocations().expect("invocations readable");
    assert_eq!(invocations.len(), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn progress_messages_and_output_reach_the_caller(backend: Arc<ScriptedExecutionBackend>) {
    backend
        .script(
            agent("planner"),
            ExecutionScript::new()
                .with_steps([step(0.1, "loading"), step(0.6, "drafting")])
                .with_output(json!({"summary": "done"})),
        )
        .expect("script planner");
    let service = coordinator(&backend);
    let request = ExecutionRequest::new(agent("planner"), "plan sprint")
        .expect("valid request")
        .with_parameter("sprint", json!(42));

    let mut ticket = service.request_execution(request).expect("dispatch accepted");
    let events = ticket.drain_progress().await;
    let outcome = ticket.outcome().await.expect("dispatch succeeds");

    let messages: Vec<Option<&str>> = events.iter().map(ExecutionProgress::message).collect();
    assert_eq!(messages, vec![Some("loading"), Some("drafting"), None]);
    assert_eq!(outcome.output(), Some(&json!({"summary": "done"})));
    let invocations = backend.invocations().expect("invocations readable");
    assert_eq!(
        invocations
            .first()
            .and_then(|request| request.parameters().get("sprint")),
        Some(&json!(42))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_requests_for_one_agent_admit_exactly_one(
    backend: Arc<ScriptedExecutionBackend>,
) {
    backend
        .script(agent("planner"), ExecutionScript::new().gated())
        .expect("script planner");
    let service = coordinator(&backend);

    let attempts: Vec<_> = (0..8)
        .map(|_| {
            let racing = service.clone();
            tokio::spawn(async move {
                let request =
                    ExecutionRequest::new(agent("planner"), "race").expect("valid request");
                racing.request_execution(request)
            })
        })
        .collect();
    let mut accepted = Vec::new();
    let mut rejected = 0_usize;
    for attempt in attempts {
        match attempt.await.expect("request task completes") {
            Ok(ticket) => accepted.push(ticket),
            Err(ExecutionCoordinatorError::AlreadyPending(_)) => rejected += 1,
            Err(err) => panic!("unexpected dispatch error: {err}"),
        }
    }

    assert_eq!(accepted.len(), 1);
    assert_eq!(rejected, 7);
    backend.release(&agent("planner")).expect("release gate");
    for ticket in accepted {
        ticket.outcome().await.expect("dispatch succeeds");
    }
    assert_eq!(
        backend
            .invocation_count(&agent("planner"))
            .expect("count readable"),
        1
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_agent_recovers_after_acknowledgement(backend: Arc<ScriptedExecutionBackend>) {
    backend
        .script(
            agent("scout"),
            ExecutionScript::new().failing_with("crawler blocked"),
        )
        .expect("script scout");
    let service = coordinator(&backend);
    let request = ExecutionRequest::new(agent("scout"), "crawl").expect("valid request");

    let outcome = service
        .request_execution(request)
        .expect("dispatch accepted")
        .outcome()
        .await;

    assert!(outcome.is_err());
    assert_eq!(
        service
            .state(&agent("scout"))
            .expect("state readable")
            .phase(),
        ExecutionPhase::Failed
    );
    assert_eq!(
        service.acknowledge(&agent("scout")).expect("acknowledge"),
        ExecutionState::Idle
    );
    assert!(service.pending().expect("pending readable").is_empty());
}
