//! Internal metrics collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Histogram for latency tracking.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 5s, 10s
    buckets: [AtomicU64; 11],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 11] = [1, 5, 10, 25, 50, 100, 250, 500, 1000, 5000, 10000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        for (i, &bound) in Self::BUCKET_BOUNDS.iter().enumerate() {
            if ms <= bound {
                self.buckets[i].fetch_add(1, Ordering::Relaxed);
                return;
            }
        }
        // Value exceeds all buckets, add to last
        self.buckets[10].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum() as f64 / count as f64
        }
    }
}

/// Collected metrics for the session ledger.
#[derive(Debug, Default)]
pub struct Metrics {
    // Ingest metrics
    pub reports_received: Counter,
    pub reports_rejected: Counter,
    pub sessions_created: Counter,
    pub sessions_updated: Counter,
    pub sessions_auto_closed: Counter,
    pub clients_synced: Counter,

    // Query metrics
    pub timeline_queries: Counter,

    // Store metrics
    pub ledger_errors: Counter,

    // Latency histograms
    pub ingest_latency_ms: Histogram,
    pub query_latency_ms: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            reports_received: self.reports_received.get(),
            reports_rejected: self.reports_rejected.get(),
            sessions_created: self.sessions_created.get(),
            sessions_updated: self.sessions_updated.get(),
            sessions_auto_closed: self.sessions_auto_closed.get(),
            clients_synced: self.clients_synced.get(),
            timeline_queries: self.timeline_queries.get(),
            ledger_errors: self.ledger_errors.get(),
            ingest_latency_mean_ms: self.ingest_latency_ms.mean(),
            query_latency_mean_ms: self.query_latency_ms.mean(),
        }
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub reports_received: u64,
    pub reports_rejected: u64,
    pub sessions_created: u64,
    pub sessions_updated: u64,
    pub sessions_auto_closed: u64,
    pub clients_synced: u64,
    pub timeline_queries: u64,
    pub ledger_errors: u64,
    pub ingest_latency_mean_ms: f64,
    pub query_latency_mean_ms: f64,
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
