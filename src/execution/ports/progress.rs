//! Progress channel between a backend and the caller of a dispatch.

use crate::execution::domain::{ExecutionId, ExecutionProgress};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors returned when a progress event cannot be accepted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProgressSinkError {
    /// The fraction is lower than the last reported one.
    #[error("progress went backwards: {previous} -> {next}")]
    Regressed {
        /// Last accepted fraction.
        previous: String,
        /// Rejected fraction.
        next: String,
    },

    /// The dispatch already completed or settled.
    #[error("progress stream of execution {0} is closed")]
    Closed(ExecutionId),

    /// The sink state lock was poisoned.
    #[error("progress sink state unavailable: {0}")]
    StateUnavailable(String),
}

#[derive(Debug)]
struct SinkState {
    last_fraction: Option<f64>,
    // Taken on close so the stream ends even while sink clones linger.
    sender: Option<mpsc::UnboundedSender<ExecutionProgress>>,
}

/// Creates the sink and stream of one dispatch.
#[must_use]
pub fn progress_channel(execution_id: ExecutionId) -> (ProgressSink, ProgressStream) {
    let (sender, receiver) = mpsc::unbounded_channel();
    let sink = ProgressSink {
        execution_id,
        state: Arc::new(Mutex::new(SinkState {
            last_fraction: None,
            sender: Some(sender),
        })),
    };
    let stream = ProgressStream {
        execution_id,
        receiver,
    };
    (sink, stream)
}

/// Write side of a dispatch's progress channel.
///
/// Clones share ordering state, so a backend may report from several tasks.
/// Fractions must not decrease; nothing is accepted after a `1.0` event or
/// after the dispatch settles. Closing ends the stream for every clone.
/// Reporting to a stream the caller dropped is not an error.
#[derive(Debug, Clone)]
pub struct ProgressSink {
    execution_id: ExecutionId,
    state: Arc<Mutex<SinkState>>,
}

impl ProgressSink {
    /// Returns the dispatch this sink belongs to.
    #[must_use]
    pub const fn execution_id(&self) -> ExecutionId {
        self.execution_id
    }

    /// Publishes a progress event.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressSinkError::Regressed`] when the fraction is lower
    /// than the previous one, [`ProgressSinkError::Closed`] once the stream
    /// completed or the dispatch settled, and
    /// [`ProgressSinkError::StateUnavailable`] when the state lock is
    /// poisoned.
    pub fn report(&self, progress: ExecutionProgress) -> Result<(), ProgressSinkError> {
        let mut state = self.lock_state()?;
        if state.sender.is_none() {
            tracing::warn!(execution_id = %self.execution_id, "progress reported after close");
            return Err(ProgressSinkError::Closed(self.execution_id));
        }
        if let Some(previous) = state.last_fraction
            && progress.fraction() < previous
        {
            tracing::warn!(
                execution_id = %self.execution_id,
                previous,
                next = progress.fraction(),
                "progress went backwards, event rejected"
            );
            return Err(ProgressSinkError::Regressed {
                previous: previous.to_string(),
                next: progress.fraction().to_string(),
            });
        }
        state.last_fraction = Some(progress.fraction());
        let completes = progress.is_complete();
        if let Some(sender) = &state.sender
            && sender.send(progress).is_err()
        {
            tracing::trace!(execution_id = %self.execution_id, "progress stream dropped by caller");
        }
        if completes {
            state.sender = None;
        }
        Ok(())
    }

    /// Returns whether a `1.0` event has been published.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressSinkError::StateUnavailable`] when the state lock is
    /// poisoned.
    pub fn is_complete(&self) -> Result<bool, ProgressSinkError> {
        let state = self.lock_state()?;
        Ok(state.last_fraction.is_some_and(|fraction| fraction >= 1.0))
    }

    /// Publishes the terminal `1.0` event unless it was already sent, then
    /// closes the sink. Returns whether an event was published.
    pub(crate) fn finish(&self) -> Result<bool, ProgressSinkError> {
        if self.is_complete()? {
            return Ok(false);
        }
        self.report(ExecutionProgress::completed())?;
        Ok(true)
    }

    /// Closes the sink and ends the stream. Late reports from lingering
    /// clones are rejected.
    pub(crate) fn close(&self) -> Result<(), ProgressSinkError> {
        let mut state = self.lock_state()?;
        state.sender = None;
        Ok(())
    }

    fn lock_state(&self) -> Result<std::sync::MutexGuard<'_, SinkState>, ProgressSinkError> {
        self.state
            .lock()
            .map_err(|err| ProgressSinkError::StateUnavailable(err.to_string()))
    }
}

/// Read side of a dispatch's progress channel.
///
/// The stream is finite: it ends after a `1.0` event, once the dispatch has
/// settled, or when every sink clone has been dropped.
#[derive(Debug)]
pub struct ProgressStream {
    execution_id: ExecutionId,
    receiver: mpsc::UnboundedReceiver<ExecutionProgress>,
}

impl ProgressStream {
    /// Returns the dispatch this stream belongs to.
    #[must_use]
    pub const fn execution_id(&self) -> ExecutionId {
        self.execution_id
    }

    /// Waits for the next event; `None` once the stream has ended.
    pub async fn recv(&mut self) -> Option<ExecutionProgress> {
        self.receiver.recv().await
    }

    /// Returns an already-delivered event without waiting.
    pub fn try_recv(&mut self) -> Option<ExecutionProgress> {
        self.receiver.try_recv().ok()
    }

    /// Waits for the stream to end and returns every remaining event.
    pub async fn collect_remaining(&mut self) -> Vec<ExecutionProgress> {
        let mut events = Vec::new();
        while let Some(event) = self.receiver.recv().await {
            events.push(event);
        }
        events
    }
}
