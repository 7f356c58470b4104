//! Job metrics.
//!
//! Counters are plain atomics; duration samples live behind a mutex in
//! a bounded ring so long batch runs cannot grow memory without limit.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// How many job durations the ring retains for percentile estimates.
const MAX_DURATION_SAMPLES: usize = 1000;

/// Collects job counts and duration percentiles across a processor's
/// lifetime.
#[derive(Debug)]
pub struct PipelineMetrics {
    /// Jobs accepted for processing.
    pub jobs_started: AtomicU64,
    /// Jobs that produced their final artifact.
    pub jobs_succeeded: AtomicU64,
    /// Jobs that returned an error.
    pub jobs_failed: AtomicU64,
    duration_samples: Mutex<VecDeque<Duration>>,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            jobs_started: AtomicU64::new(0),
            jobs_succeeded: AtomicU64::new(0),
            jobs_failed: AtomicU64::new(0),
            duration_samples: Mutex::new(VecDeque::with_capacity(MAX_DURATION_SAMPLES)),
        }
    }

    /// Count a job entering the pipeline.
    pub fn record_started(&self) {
        self.jobs_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a finished job and keep its duration for the percentiles.
    pub fn record_success(&self, duration: Duration) {
        self.jobs_succeeded.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut samples) = self.duration_samples.lock() {
            if samples.len() == MAX_DURATION_SAMPLES {
                samples.pop_front();
            }
            samples.push_back(duration);
        }
    }

    /// Count a failed job. Failures contribute no duration sample.
    pub fn record_failure(&self) {
        self.jobs_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot the counters and duration percentiles.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let mut sorted: Vec<Duration> = self
            .duration_samples
            .lock()
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default();
        sorted.sort_unstable();

        MetricsSnapshot {
            jobs_started: self.jobs_started.load(Ordering::Relaxed),
            jobs_succeeded: self.jobs_succeeded.load(Ordering::Relaxed),
            jobs_failed: self.jobs_failed.load(Ordering::Relaxed),
            duration_p50: percentile(&sorted, 50),
            duration_p95: percentile(&sorted, 95),
            sample_count: sorted.len() as u64,
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Nearest-rank percentile over an ascending slice.
fn percentile(sorted: &[Duration], pct: usize) -> Option<Duration> {
    if sorted.is_empty() {
        return None;
    }
    sorted.get(sorted.len() * pct / 100).copied()
}

/// A point-in-time view of the collected metrics.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MetricsSnapshot {
    /// Jobs accepted for processing.
    pub jobs_started: u64,
    /// Jobs that produced their final artifact.
    pub jobs_succeeded: u64,
    /// Jobs that returned an error.
    pub jobs_failed: u64,
    /// Median job duration, if any samples exist.
    #[serde(
        serialize_with = "serialize_duration_ms",
        deserialize_with = "deserialize_duration_ms"
    )]
    pub duration_p50: Option<Duration>,
    /// 95th-percentile job duration, if any samples exist.
    #[serde(
        serialize_with = "serialize_duration_ms",
        deserialize_with = "deserialize_duration_ms"
    )]
    pub duration_p95: Option<Duration>,
    /// Samples backing the percentiles.
    pub sample_count: u64,
}

/// Durations serialize as integral milliseconds.
fn serialize_duration_ms<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match duration {
        Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
        None => serializer.serialize_none(),
    }
}

fn deserialize_duration_ms<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let ms: Option<u64> = serde::Deserialize::deserialize(deserializer)?;
    Ok(ms.map(Duration::from_millis))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_counting() {
        let m = PipelineMetrics::new();
        m.record_started();
        m.record_started();
        m.record_success(Duration::from_secs(5));
        m.record_failure();

        let snap = m.snapshot();
        assert_eq!(snap.jobs_started, 2);
        assert_eq!(snap.jobs_succeeded, 1);
        assert_eq!(snap.jobs_failed, 1);
        assert_eq!(snap.sample_count, 1);
    }

    #[test]
    fn test_metrics_percentiles() {
        let m = PipelineMetrics::new();
        for i in 1..=100 {
            m.record_success(Duration::from_millis(i * 10));
        }

        let snap = m.snapshot();
        assert_eq!(snap.duration_p50, Some(Duration::from_millis(510)));
        assert_eq!(snap.duration_p95, Some(Duration::from_millis(960)));
    }

    #[test]
    fn test_metrics_empty_percentiles() {
        let m = PipelineMetrics::new();
        let snap = m.snapshot();
        assert!(snap.duration_p50.is_none());
        assert!(snap.duration_p95.is_none());
    }

    #[test]
    fn test_sample_ring_capped() {
        let m = PipelineMetrics::new();
        for i in 0..1200 {
            m.record_success(Duration::from_millis(i));
        }

        let snap = m.snapshot();
        assert_eq!(snap.sample_count, 1000);
        assert_eq!(snap.jobs_succeeded, 1200);
        // The oldest 200 samples were evicted.
        assert_eq!(snap.duration_p50, Some(Duration::from_millis(700)));
    }

    #[test]
    fn test_snapshot_serialization() {
        let m = PipelineMetrics::new();
        m.record_started();
        m.record_success(Duration::from_secs(3));

        let snap = m.snapshot();
        let json = serde_json::to_value(&snap).expect("serialize");
        assert_eq!(json["jobs_succeeded"], 1);
        assert_eq!(json["duration_p50"], 3000);

        let back: MetricsSnapshot = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back.duration_p50, Some(Duration::from_secs(3)));
    }
}
