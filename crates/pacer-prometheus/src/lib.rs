//! Prometheus metrics backend for the pacer stagger controller.
//!
//! This crate provides a [`PrometheusMetrics`] implementation of
//! [`pacer_core::MetricsBackend`] that exposes metrics in Prometheus format.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use pacer_prometheus::PrometheusMetrics;
//! use pacer_core::{controller::StaggerController, tracker::KeyedRequestTracker};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let controller = StaggerController::new(Arc::new(KeyedRequestTracker::new()))
//!     .with_metrics(Arc::new(metrics.clone()));
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `pacer_stagger_waits_total{operation}` - Counter
//! - `pacer_stagger_delay_seconds{operation}` - Histogram
//! - `pacer_attempts_failed_total{operation}` - Counter
//! - `pacer_attempts_completed_total{operation, outcome}` - Counter
//!
//! ## HTTP Server
//! This crate does NOT provide an HTTP server for a `/metrics` endpoint.
//! Use your application's existing HTTP framework and encode
//! [`PrometheusMetrics::gather`] with `prometheus::TextEncoder`.

mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
