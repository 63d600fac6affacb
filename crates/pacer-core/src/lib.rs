pub mod backoff;
pub mod controller;
pub mod error;
pub mod metrics;
pub mod tracker;

pub use metrics::{AttemptOutcome, MetricsBackend, MetricsHandle};

pub mod prelude {
    pub use crate::backoff::{raw_delay, stagger_delay};
    pub use crate::controller::StaggerController;
    pub use crate::error::{CancelPhase, StaggerError, StaggerResult};
    pub use crate::metrics::{AttemptOutcome, MetricsBackend, MetricsHandle, noop_metrics};
    pub use crate::tracker::{KeyedRequestTracker, TrackerEntry};
}
