//! Application services for execution dispatch.

mod coordinator;
mod ledger;

pub use coordinator::{
    CoordinatorConfig, ExecutionCoordinator, ExecutionCoordinatorError,
    ExecutionCoordinatorResult, ExecutionTicket,
};
pub use ledger::ExecutionLedger;
