//! Result payload of a successful dispatch.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What the backend returned when a dispatch succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    output: Option<Value>,
}

impl ExecutionOutcome {
    /// Creates an outcome without output.
    #[must_use]
    pub const fn empty() -> Self {
        Self { output: None }
    }

    /// Creates an outcome carrying backend output.
    #[must_use]
    pub const fn with_output(output: Value) -> Self {
        Self {
            output: Some(output),
        }
    }

    /// Returns the backend output, if any.
    #[must_use]
    pub const fn output(&self) -> Option<&Value> {
        self.output.as_ref()
    }
}
