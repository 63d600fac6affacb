use std::fmt;

use thiserror::Error;

use pacer_model::OperationKind;

/// Phase of an `execute` call at the moment cancellation fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelPhase {
    /// Waiting out the backoff window before dispatch.
    Stagger,
    /// The wrapped operation itself.
    Dispatch,
}

impl CancelPhase {
    /// Return label value for logs and metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            CancelPhase::Stagger => "stagger",
            CancelPhase::Dispatch => "dispatch",
        }
    }
}

impl fmt::Display for CancelPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Errors surfaced by the stagger controller.
///
/// The controller never swallows a wrapped-operation failure: each failed
/// attempt surfaces exactly one of these, carrying enough context (key,
/// attempt, bound) for the caller to decide whether to re-invoke.
#[derive(Debug, Error)]
pub enum StaggerError {
    /// The operation failed and the retry bound has not been reached.
    ///
    /// The tracker keeps the advanced attempt count, so the next call for
    /// this key staggers accordingly.
    #[error("transient failure for '{key}' on attempt {attempt}: {reason}")]
    Transient {
        key: String,
        kind: OperationKind,
        attempt: u32,
        reason: String,
    },

    /// The retry bound was reached; the key's tracker entry is cleared.
    #[error("retries exhausted for {kind}: bound of {max_retries} reached")]
    RetriesExhausted {
        kind: OperationKind,
        max_retries: u32,
    },

    /// An enclosing deadline canceled the call; the key's tracker entry is
    /// cleared so no stale attempt count staggers future unrelated work.
    #[error("canceled during {phase} for '{key}'")]
    Canceled { key: String, phase: CancelPhase },
}

impl StaggerError {
    /// Returns `true` for failures the caller may retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, StaggerError::Transient { .. })
    }

    /// Attempt number carried by a transient failure.
    pub fn attempt(&self) -> Option<u32> {
        match self {
            StaggerError::Transient { attempt, .. } => Some(*attempt),
            _ => None,
        }
    }
}

pub type StaggerResult<T> = Result<T, StaggerError>;
