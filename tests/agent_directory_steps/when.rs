//! When steps for agent directory BDD scenarios.

use super::world::{DirectoryWorld, run_async};
use rstest_bdd_macros::when;

#[when("the directory is refreshed")]
fn refresh_directory(world: &mut DirectoryWorld) {
    world.last_view = Some(run_async(world.service.refresh()));
}
