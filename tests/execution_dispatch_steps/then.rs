//! Then steps for execution dispatch BDD scenarios.

use super::world::{DispatchWorld, build_request, run_async};
use eyre::WrapErr;
use marshal::execution::{domain::AgentId, services::ExecutionCoordinatorError};
use rstest_bdd_macros::then;

#[then("the second request is rejected as already pending")]
fn second_request_rejected(world: &mut DispatchWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_request
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing follow-up request in scenario world"))?;
    if !matches!(result, Err(ExecutionCoordinatorError::AlreadyPending(_))) {
        return Err(eyre::eyre!("expected already pending error, got {result:?}"));
    }
    Ok(())
}

#[then(r#"agent "{id}" is pending"#)]
fn agent_is_pending(world: &mut DispatchWorld, id: String) -> Result<(), eyre::Report> {
    if !world.coordinator.is_pending(&AgentId::new(id.as_str())?)? {
        return Err(eyre::eyre!("expected agent '{id}' to be pending"));
    }
    Ok(())
}

#[then(r#"agent "{id}" is in phase "{phase}""#)]
fn agent_in_phase(world: &mut DispatchWorld, id: String, phase: String) -> Result<(), eyre::Report> {
    let state = world.coordinator.state(&AgentId::new(id.as_str())?)?;
    if state.phase().as_str() != phase {
        return Err(eyre::eyre!(
            "expected agent '{id}' in phase '{phase}', got {state:?}"
        ));
    }
    Ok(())
}

#[then(r#"the failure reason mentions "{text}""#)]
fn failure_reason_mentions(world: &mut DispatchWorld, text: String) -> Result<(), eyre::Report> {
    let agent_id = world
        .settled_agent
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no settled dispatch in scenario world"))?;
    let state = world.coordinator.state(agent_id)?;
    if !state
        .failure_reason()
        .is_some_and(|reason| reason.contains(&text))
    {
        return Err(eyre::eyre!("expected failure mentioning '{text}', got {state:?}"));
    }
    Ok(())
}

#[then(r#"another execution for "{id}" is accepted"#)]
fn another_execution_accepted(world: &mut DispatchWorld, id: String) -> Result<(), eyre::Report> {
    let ticket = world
        .coordinator
        .request_execution(build_request(&id)?)
        .wrap_err("follow-up execution should be accepted")?;
    world.backend.release(&AgentId::new(id)?)?;
    // A scripted failure still settles; only acceptance matters here.
    let _settled = run_async(ticket.outcome());
    Ok(())
}

#[then("the progress stream has {count:usize} events ending at completion")]
fn progress_ends_at_completion(world: &mut DispatchWorld, count: usize) -> Result<(), eyre::Report> {
    let events = &world.settled_progress;
    if events.len() != count {
        return Err(eyre::eyre!("expected {count} events, got {events:?}"));
    }
    if !events.last().is_some_and(|event| event.is_complete()) {
        return Err(eyre::eyre!("expected the stream to end at 1.0, got {events:?}"));
    }
    Ok(())
}

#[then("{count:usize} agents are pending")]
fn agents_pending(world: &mut DispatchWorld, count: usize) -> Result<(), eyre::Report> {
    let pending = world.coordinator.pending()?;
    if pending.len() != count {
        return Err(eyre::eyre!("expected {count} pending agents, got {pending:?}"));
    }
    Ok(())
}
