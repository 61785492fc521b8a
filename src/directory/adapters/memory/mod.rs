//! In-memory listing sources for tests and local wiring.

mod sources;

pub use sources::{InMemoryLiveSource, InMemoryPrimarySource};
