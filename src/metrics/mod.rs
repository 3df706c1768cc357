//! Metrics for the universal verifier
//!
//! Counters for submissions and their outcomes, gauges for registry sizes and
//! a latency histogram for response verification.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Verifier metrics registry
pub struct MetricsRegistry {
    counters: RwLock<HashMap<String, Arc<AtomicU64>>>,
    gauges: RwLock<HashMap<String, Arc<AtomicU64>>>,
    histograms: RwLock<HashMap<String, Arc<Histogram>>>,
    start_time: Instant,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            counters: RwLock::new(HashMap::new()),
            gauges: RwLock::new(HashMap::new()),
            histograms: RwLock::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Increment a counter
    pub async fn inc_counter(&self, name: &str) {
        self.add_counter(name, 1).await;
    }

    /// Add to a counter
    pub async fn add_counter(&self, name: &str, value: u64) {
        if let Some(counter) = self.counters.read().await.get(name) {
            counter.fetch_add(value, Ordering::Relaxed);
            return;
        }
        self.counters
            .write()
            .await
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(AtomicU64::new(0)))
            .fetch_add(value, Ordering::Relaxed);
    }

    /// Set a gauge value
    pub async fn set_gauge(&self, name: &str, value: u64) {
        if let Some(gauge) = self.gauges.read().await.get(name) {
            gauge.store(value, Ordering::Relaxed);
            return;
        }
        self.gauges
            .write()
            .await
            .insert(name.to_string(), Arc::new(AtomicU64::new(value)));
    }

    pub async fn get_counter(&self, name: &str) -> u64 {
        self.counters
            .read()
            .await
            .get(name)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub async fn get_gauge(&self, name: &str) -> u64 {
        self.gauges
            .read()
            .await
            .get(name)
            .map(|g| g.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Record a histogram observation (seconds)
    pub async fn observe_histogram(&self, name: &str, value: f64) {
        if let Some(histogram) = self.histograms.read().await.get(name) {
            histogram.observe(value);
            return;
        }
        self.histograms
            .write()
            .await
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Histogram::default()))
            .observe(value);
    }

    pub async fn histogram_count(&self, name: &str) -> u64 {
        self.histograms
            .read()
            .await
            .get(name)
            .map(|h| h.count())
            .unwrap_or(0)
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Snapshot of all metrics as JSON
    pub async fn to_json(&self) -> serde_json::Value {
        let counters: HashMap<String, u64> = self
            .counters
            .read()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.load(Ordering::Relaxed)))
            .collect();
        let gauges: HashMap<String, u64> = self
            .gauges
            .read()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.load(Ordering::Relaxed)))
            .collect();
        let histograms: HashMap<String, serde_json::Value> = self
            .histograms
            .read()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();

        serde_json::json!({
            "uptime_seconds": self.uptime_seconds(),
            "counters": counters,
            "gauges": gauges,
            "histograms": histograms,
        })
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed-bucket histogram
pub struct Histogram {
    buckets: Vec<f64>,
    counts: Vec<AtomicU64>,
    /// Sum of observations in microseconds
    sum_micros: AtomicU64,
    count: AtomicU64,
}

impl Histogram {
    pub fn new(buckets: Vec<f64>) -> Self {
        let counts = buckets.iter().map(|_| AtomicU64::new(0)).collect();
        Self {
            buckets,
            counts,
            sum_micros: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    pub fn observe(&self, value: f64) {
        self.sum_micros
            .fetch_add((value * 1_000_000.0) as u64, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
        if let Some(i) = self.buckets.iter().position(|bucket| value <= *bucket) {
            self.counts[i].fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn to_json(&self) -> serde_json::Value {
        let counts: Vec<u64> = self.counts.iter().map(|c| c.load(Ordering::Relaxed)).collect();
        serde_json::json!({
            "buckets": self.buckets,
            "counts": counts,
            "sum": self.sum_micros.load(Ordering::Relaxed) as f64 / 1_000_000.0,
            "count": self.count(),
        })
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new(vec![
            0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
        ])
    }
}

/// Predefined metric names
pub mod metric_names {
    pub const RESPONSES_SUBMITTED: &str = "verifier.responses.submitted";
    pub const RESPONSES_VERIFIED: &str = "verifier.responses.verified";
    pub const RESPONSES_ALREADY_VERIFIED: &str = "verifier.responses.already_verified";
    pub const RESPONSES_REJECTED: &str = "verifier.responses.rejected";

    pub const REQUESTS_REGISTERED: &str = "verifier.requests.registered";
    pub const REQUESTS_OVERWRITTEN: &str = "verifier.requests.overwritten";
    pub const VALIDATORS_WHITELISTED: &str = "verifier.validators.whitelisted";

    pub const VERIFY_LATENCY: &str = "verifier.verify.latency_seconds";

    /// Per-kind rejection counter, e.g. `verifier.rejected.proof_expired`.
    pub fn rejected_kind(kind: &str) -> String {
        format!("verifier.rejected.{kind}")
    }
}

/// Time an async operation into a histogram
pub async fn timed<F, T>(metrics: &MetricsRegistry, metric_name: &str, f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    let start = Instant::now();
    let result = f.await;
    metrics
        .observe_histogram(metric_name, start.elapsed().as_secs_f64())
        .await;
    result
}
