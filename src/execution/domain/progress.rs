//! Progress events streamed during a dispatch.

use super::ExecutionDomainError;
use serde::{Deserialize, Serialize};

/// One progress update of a running dispatch.
///
/// Within a dispatch, fractions never decrease and the stream of a
/// successful dispatch ends with a fraction of `1.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawProgress")]
pub struct ExecutionProgress {
    fraction: f64,
    message: Option<String>,
}

#[derive(Deserialize)]
struct RawProgress {
    fraction: f64,
    #[serde(default)]
    message: Option<String>,
}

impl TryFrom<RawProgress> for ExecutionProgress {
    type Error = ExecutionDomainError;

    fn try_from(raw: RawProgress) -> Result<Self, Self::Error> {
        let progress = Self::new(raw.fraction)?;
        Ok(Self {
            message: raw.message,
            ..progress
        })
    }
}

impl ExecutionProgress {
    /// Creates a progress event.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionDomainError::InvalidProgressFraction`] when the
    /// fraction is not finite or lies outside `[0, 1]`.
    pub fn new(fraction: f64) -> Result<Self, ExecutionDomainError> {
        if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
            return Err(ExecutionDomainError::InvalidProgressFraction(
                fraction.to_string(),
            ));
        }
        Ok(Self {
            fraction,
            message: None,
        })
    }

    /// Creates the terminal event of a successful dispatch.
    #[must_use]
    pub const fn completed() -> Self {
        Self {
            fraction: 1.0,
            message: None,
        }
    }

    /// Attaches a human-readable message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Returns the completed fraction.
    #[must_use]
    pub const fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Returns the attached message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns whether this event marks completion.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.fraction >= 1.0
    }
}
