//! Tracing events for observability.
//!
//! Available with the `tracing` feature. These functions emit structured
//! events that metrics collectors (for example via tracing-opentelemetry)
//! can turn into counters, gauges and histograms.
//!
//! ```rust,ignore
//! use tracing_subscriber::{fmt, prelude::*, EnvFilter};
//!
//! tracing_subscriber::registry()
//!     .with(fmt::layer())
//!     .with(EnvFilter::from_default_env()
//!         .add_directive("rust_dispatch_pool=trace".parse().unwrap()))
//!     .init();
//! ```

use crate::core::SinkError;
use std::time::Duration;

/// Records an item accepted into a worker's queue.
#[inline]
pub fn record_submission(worker_id: usize, queue_depth: usize) {
    tracing::trace!(
        counter.items_submitted = 1,
        gauge.queue_depth = queue_depth as i64,
        worker_id = worker_id,
        "item submitted"
    );
}

/// Records one sink delivery with timing.
#[inline]
pub fn record_delivery(worker_id: usize, bytes: usize, duration: Duration, success: bool) {
    let duration_us = duration.as_micros() as u64;
    if success {
        tracing::trace!(
            counter.items_delivered = 1,
            counter.bytes_delivered = bytes as u64,
            histogram.delivery_duration_us = duration_us,
            worker_id = worker_id,
            "item delivered"
        );
    } else {
        tracing::trace!(
            counter.items_failed = 1,
            histogram.delivery_duration_us = duration_us,
            worker_id = worker_id,
            "item delivery failed"
        );
    }
}

/// Records a worker stopping because its sink failed.
#[inline]
pub fn record_worker_failure(worker_id: usize, error: &SinkError) {
    tracing::error!(
        counter.worker_failures = 1,
        worker_id = worker_id,
        error = %error,
        "worker sink failed"
    );
}

/// Records pool startup.
#[inline]
pub fn record_pool_start(num_workers: usize, pool_name: &str) {
    tracing::info!(
        workers = num_workers,
        pool = pool_name,
        "dispatch pool started"
    );
}

/// Records pool shutdown.
#[inline]
pub fn record_pool_shutdown(items_delivered: u64, items_discarded: u64) {
    tracing::info!(
        items_delivered = items_delivered,
        items_discarded = items_discarded,
        "dispatch pool shutdown complete"
    );
}
