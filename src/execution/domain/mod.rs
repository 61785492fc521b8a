//! Domain model for execution dispatch.
//!
//! A dispatch is identified by an [`ExecutionId`], streams
//! [`ExecutionProgress`] events, and moves its agent through the
//! [`ExecutionState`] machine.

mod error;
mod event;
mod ids;
mod outcome;
mod progress;
mod request;
mod state;

pub use crate::directory::domain::AgentId;
pub use error::ExecutionDomainError;
pub use event::ExecutionEvent;
pub use ids::ExecutionId;
pub use outcome::ExecutionOutcome;
pub use progress::ExecutionProgress;
pub use request::ExecutionRequest;
pub use state::{ExecutionPhase, ExecutionState};
