use std::sync::Arc;

/// Attempt outcome for metrics classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The operation succeeded; the key returned to idle.
    Success,
    /// The operation failed but remains retryable.
    Failure,
    /// The retry bound was reached.
    Exhausted,
    /// An enclosing deadline canceled the attempt.
    Canceled,
}

impl AttemptOutcome {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            AttemptOutcome::Success => "success",
            AttemptOutcome::Failure => "failure",
            AttemptOutcome::Exhausted => "exhausted",
            AttemptOutcome::Canceled => "canceled",
        }
    }
}

/// Backend metrics collection interface.
///
/// This trait abstracts metrics collection across different backends and
/// mirrors the controller's two observability hook points: "about to stagger
/// by D for key K" and "operation failed for key K on attempt A", plus a
/// completion record per attempt.
pub trait MetricsBackend: Send + Sync + 'static {
    /// Record that a dispatch is about to be staggered.
    ///
    /// Called before the controller sleeps out the backoff window.
    ///
    /// # Arguments
    /// - `operation`: operation kind label
    /// - `delay_ms`: wait applied before dispatch
    fn record_stagger(&self, operation: &str, delay_ms: u64);

    /// Record a failed attempt that remains retryable.
    ///
    /// # Arguments
    /// - `operation`: operation kind label
    /// - `attempt`: 0-based attempt that failed
    fn record_attempt_failed(&self, operation: &str, attempt: u32);

    /// Record attempt completion with outcome and duration.
    ///
    /// Called on every exit of a dispatch (success, failure, exhausted,
    /// canceled).
    ///
    /// # Arguments
    /// - `operation`: operation kind label
    /// - `outcome`: how the attempt terminated
    /// - `duration_ms`: dispatch time in milliseconds
    fn record_attempt_completed(&self, operation: &str, outcome: AttemptOutcome, duration_ms: u64);
}

/// Shared handle to a metrics backend.
///
/// Stored in the controller and cloned wherever attempts are recorded.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
