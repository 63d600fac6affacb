use std::sync::Arc;

use prometheus::{CounterVec, HistogramVec, Opts, Registry, proto::MetricFamily};

use pacer_core::{AttemptOutcome, MetricsBackend};

/// Prometheus metrics backend for pacer.
///
/// Implements [`MetricsBackend`] and exposes metrics that can be scraped via
/// an HTTP endpoint.
///
/// ## Metrics
/// - `pacer_stagger_waits_total{operation}` - Counter of staggered dispatches
/// - `pacer_stagger_delay_seconds{operation}` - Histogram of applied stagger delays
/// - `pacer_attempts_failed_total{operation}` - Counter of retryable failures
/// - `pacer_attempts_completed_total{operation, outcome}` - Counter of attempt exits
///
/// ## Label cardinality
/// All labels are bounded (low cardinality):
/// - `operation`: "create", "update", "cancel", "frequency-change", "pause", "resume"
/// - `outcome`: "success", "failure", "exhausted", "canceled"
#[derive(Clone)]
pub struct PrometheusMetrics {
    stagger_waits: CounterVec,
    stagger_delay: HistogramVec,
    attempts_failed: CounterVec,
    attempts_completed: CounterVec,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    /// Create a new prometheus metrics backend with custom registry.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let stagger_waits = CounterVec::new(
            Opts::new(
                "pacer_stagger_waits_total",
                "Total number of staggered dispatches",
            )
            .namespace("pacer"),
            &["operation"],
        )?;
        registry.register(Box::new(stagger_waits.clone()))?;

        let stagger_delay = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "pacer_stagger_delay_seconds",
                "Stagger delay applied before dispatch in seconds",
            )
            .namespace("pacer")
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
            &["operation"],
        )?;
        registry.register(Box::new(stagger_delay.clone()))?;

        let attempts_failed = CounterVec::new(
            Opts::new(
                "pacer_attempts_failed_total",
                "Total number of retryable attempt failures",
            )
            .namespace("pacer"),
            &["operation"],
        )?;
        registry.register(Box::new(attempts_failed.clone()))?;

        let attempts_completed = CounterVec::new(
            Opts::new(
                "pacer_attempts_completed_total",
                "Total number of completed attempts",
            )
            .namespace("pacer"),
            &["operation", "outcome"],
        )?;
        registry.register(Box::new(attempts_completed.clone()))?;

        Ok(Self {
            stagger_waits,
            stagger_delay,
            attempts_failed,
            attempts_completed,
            registry,
        })
    }

    /// Create a new prometheus metrics backend with default registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    /// Gather all metrics for exposition.
    ///
    /// Use this to implement a `/metrics` HTTP endpoint.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Get reference to underlying prometheus registry.
    ///
    /// Useful for registering custom metrics alongside pacer metrics.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_stagger(&self, operation: &str, delay_ms: u64) {
        self.stagger_waits.with_label_values(&[operation]).inc();
        self.stagger_delay
            .with_label_values(&[operation])
            .observe(delay_ms as f64 / 1000.0);
    }

    fn record_attempt_failed(&self, operation: &str, _attempt: u32) {
        self.attempts_failed.with_label_values(&[operation]).inc();
    }

    fn record_attempt_completed(&self, operation: &str, outcome: AttemptOutcome, _duration_ms: u64) {
        self.attempts_completed
            .with_label_values(&[operation, outcome.as_label()])
            .inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_create_prometheus_metrics() {
        let _metrics = PrometheusMetrics::new().expect("failed to create metrics");
    }

    #[test]
    fn record_stagger_tracks_operations_separately() {
        let metrics = PrometheusMetrics::new().unwrap();

        metrics.record_stagger("create", 200);
        metrics.record_stagger("create", 400);
        metrics.record_stagger("cancel", 100);

        let families = metrics.gather();
        let waits = families
            .iter()
            .find(|f| f.name() == "pacer_pacer_stagger_waits_total")
            .expect("stagger counter not found");

        assert_eq!(waits.get_metric().len(), 2);
    }

    #[test]
    fn record_attempt_completed_splits_by_outcome() {
        let metrics = PrometheusMetrics::new().unwrap();

        metrics.record_attempt_completed("update", AttemptOutcome::Success, 120);
        metrics.record_attempt_completed("update", AttemptOutcome::Exhausted, 80);

        let families = metrics.gather();
        let completed = families
            .iter()
            .find(|f| f.name() == "pacer_pacer_attempts_completed_total")
            .expect("completed counter not found");

        assert_eq!(completed.get_metric().len(), 2);
    }

    #[test]
    fn can_use_custom_registry() {
        let registry = Arc::new(Registry::new());
        let metrics = PrometheusMetrics::new_with_registry(registry.clone()).unwrap();

        metrics.record_attempt_failed("create", 0);
        assert!(!registry.gather().is_empty());
    }

    #[test]
    fn duplicate_registration_fails() {
        let registry = Arc::new(Registry::new());
        let _first = PrometheusMetrics::new_with_registry(Arc::clone(&registry)).unwrap();
        assert!(PrometheusMetrics::new_with_registry(registry).is_err());
    }
}
