//! Services for agent directory reconciliation.

mod directory;
mod merge;

pub use directory::{
    AgentDirectoryService, DirectoryListing, DirectoryView, LiveOverlay, SourceState,
};
pub use merge::{AgentDirectory, DEFAULT_LIVE_DESCRIPTION_TEMPLATE, DirectoryConfig};
