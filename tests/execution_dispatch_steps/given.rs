//! Given steps for execution dispatch BDD scenarios.

use super::world::DispatchWorld;
use marshal::execution::{
    adapters::memory::ExecutionScript,
    domain::{AgentId, ExecutionProgress},
};
use rstest_bdd_macros::given;

#[given(r#"agent "{id}" holds its execution until released"#)]
fn agent_holds_execution(world: &mut DispatchWorld, id: String) -> Result<(), eyre::Report> {
    world
        .backend
        .script(AgentId::new(id)?, ExecutionScript::new().gated())?;
    Ok(())
}

#[given(r#"agent "{id}" fails with "{reason}""#)]
fn agent_fails_with(world: &mut DispatchWorld, id: String, reason: String) -> Result<(), eyre::Report> {
    world
        .backend
        .script(AgentId::new(id)?, ExecutionScript::new().failing_with(reason))?;
    Ok(())
}

#[given(r#"agent "{id}" reports progress {first:f64} then {second:f64}"#)]
fn agent_reports_progress(
    world: &mut DispatchWorld,
    id: String,
    first: f64,
    second: f64,
) -> Result<(), eyre::Report> {
    let script = ExecutionScript::new()
        .with_step(ExecutionProgress::new(first)?)
        .with_step(ExecutionProgress::new(second)?);
    world.backend.script(AgentId::new(id)?, script)?;
    Ok(())
}
