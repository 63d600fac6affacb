//! Stagger controller: per-key pacing and retry bookkeeping.
//!
//! The controller performs at most one stagger sleep and one dispatch per
//! call. Re-trying after a transient failure is the caller's decision, made by
//! invoking [`StaggerController::execute`] again with an advanced context —
//! staggering is automatic, retry-looping is caller-driven.

use std::{fmt, future::Future, sync::Arc, time::Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use pacer_model::{BackoffPolicy, RequestContext};

use crate::{
    backoff::stagger_delay,
    error::{CancelPhase, StaggerError, StaggerResult},
    metrics::{AttemptOutcome, MetricsHandle, noop_metrics},
    tracker::KeyedRequestTracker,
};

/// Orchestrates staggered dispatch and retry bookkeeping per key.
///
/// One controller owns one injected [`KeyedRequestTracker`]; independent
/// controllers never share history. Many keys execute concurrently — there is
/// no global lock. Within one key, calls serialize on the tracker's per-key
/// gate so the "at most one entry per key" invariant holds at rest.
pub struct StaggerController {
    tracker: Arc<KeyedRequestTracker>,
    metrics: MetricsHandle,
}

impl StaggerController {
    /// Controller over the given tracker with no-op metrics.
    pub fn new(tracker: Arc<KeyedRequestTracker>) -> Self {
        Self {
            tracker,
            metrics: noop_metrics(),
        }
    }

    /// Replace the metrics backend.
    ///
    /// This is a builder-style helper used at wiring time.
    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    /// Shared handle to the underlying tracker.
    pub fn tracker(&self) -> Arc<KeyedRequestTracker> {
        Arc::clone(&self.tracker)
    }

    /// Execute one staggered attempt for the given context.
    ///
    /// Convenience wrapper over [`execute_with_cancel`](Self::execute_with_cancel)
    /// with a token that never fires.
    pub async fn execute<F, Fut, T, E>(
        &self,
        ctx: &RequestContext,
        policy: &BackoffPolicy,
        operation: F,
    ) -> StaggerResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        self.execute_with_cancel(ctx, policy, &CancellationToken::new(), operation)
            .await
    }

    /// Execute one staggered attempt, abortable through `cancel`.
    ///
    /// Steps, keyed by `ctx.stagger_key()`:
    /// 1. serialize on the key's gate;
    /// 2. if the tracker holds an entry for the key, sleep out the backoff
    ///    window computed from its recorded attempt — a fresh key dispatches
    ///    with zero delay;
    /// 3. record this context's attempt and invoke the operation;
    /// 4. success clears the entry and returns the value; failure either
    ///    advances the recorded attempt (transient) or clears the entry
    ///    (retry bound reached, or canceled).
    ///
    /// Cancellation during the sleep or the dispatch clears the key's entry:
    /// a stale attempt count must not stagger future unrelated work.
    #[instrument(
        level = "debug",
        skip(self, ctx, policy, cancel, operation),
        fields(key = %ctx.stagger_key(), attempt = ctx.attempt)
    )]
    pub async fn execute_with_cancel<F, Fut, T, E>(
        &self,
        ctx: &RequestContext,
        policy: &BackoffPolicy,
        cancel: &CancellationToken,
        operation: F,
    ) -> StaggerResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let key = ctx.stagger_key();
        let operation_label = ctx.kind.kind();

        // Declared before the gate so it runs after the gate handle is gone
        // and can prune the key's slot once nothing references it.
        let _prune = PruneOnExit {
            tracker: self.tracker.as_ref(),
            key: key.clone(),
        };
        let gate = self.tracker.gate(&key);
        let _serialized = gate.lock().await;

        if let Some(entry) = self.tracker.get(&key) {
            let delay = stagger_delay(policy, entry.attempt());
            if !delay.is_zero() {
                debug!(
                    delay_ms = delay.as_millis() as u64,
                    recorded_attempt = entry.attempt(),
                    "staggering dispatch"
                );
                self.metrics
                    .record_stagger(operation_label, delay.as_millis() as u64);

                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = cancel.cancelled() => {
                        self.tracker.remove(&key);
                        return Err(StaggerError::Canceled {
                            key,
                            phase: CancelPhase::Stagger,
                        });
                    }
                }
            }
        }

        self.tracker.record(&key, ctx.attempt);

        let started = Instant::now();
        let result = tokio::select! {
            res = operation() => res,
            _ = cancel.cancelled() => {
                self.tracker.remove(&key);
                self.metrics.record_attempt_completed(
                    operation_label,
                    AttemptOutcome::Canceled,
                    started.elapsed().as_millis() as u64,
                );
                return Err(StaggerError::Canceled {
                    key,
                    phase: CancelPhase::Dispatch,
                });
            }
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(value) => {
                self.tracker.remove(&key);
                self.metrics.record_attempt_completed(
                    operation_label,
                    AttemptOutcome::Success,
                    elapsed_ms,
                );
                Ok(value)
            }
            Err(err) => {
                debug!(error = %err, "operation failed");

                if let Some(max_retries) = policy.max_retries()
                    && ctx.attempt >= max_retries
                {
                    self.tracker.remove(&key);
                    self.metrics.record_attempt_completed(
                        operation_label,
                        AttemptOutcome::Exhausted,
                        elapsed_ms,
                    );
                    return Err(StaggerError::RetriesExhausted {
                        kind: ctx.kind,
                        max_retries,
                    });
                }

                self.tracker.record(&key, ctx.attempt.saturating_add(1));
                self.metrics.record_attempt_failed(operation_label, ctx.attempt);
                self.metrics.record_attempt_completed(
                    operation_label,
                    AttemptOutcome::Failure,
                    elapsed_ms,
                );
                Err(StaggerError::Transient {
                    key,
                    kind: ctx.kind,
                    attempt: ctx.attempt,
                    reason: err.to_string(),
                })
            }
        }
    }
}

struct PruneOnExit<'a> {
    tracker: &'a KeyedRequestTracker,
    key: String,
}

impl Drop for PruneOnExit<'_> {
    fn drop(&mut self) {
        self.tracker.release(&self.key);
    }
}
