//! Metrics collection abstraction for the stagger controller.
//!
//! Backends (prometheus, statsd, etc) implement [`MetricsBackend`] and are
//! injected into [`crate::controller::StaggerController`] at construction.
mod backend;
pub use backend::{AttemptOutcome, MetricsBackend, MetricsHandle};

mod noop;
pub use noop::NoOpMetrics;

use std::sync::Arc;

/// Create a no-op metrics handle.
#[inline]
pub fn noop_metrics() -> MetricsHandle {
    Arc::new(NoOpMetrics)
}
