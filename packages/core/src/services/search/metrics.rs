//! Shadow search metrics
//!
//! Records the outcome of each shadow comparison (the active permission
//! strategy against the inactive one) with the time each side took.
//!
//! # Usage
//!
//! ```rust
//! use panelstore_core::services::search::{SearchMetricsCollector, ShadowOutcome};
//! use std::time::Duration;
//!
//! let mut collector = SearchMetricsCollector::new();
//! collector.record(ShadowOutcome::Equal, Duration::from_millis(4), Duration::from_millis(6));
//! assert_eq!(collector.count(ShadowOutcome::Equal), 1);
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;

/// Result of comparing the active search with its shadow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShadowOutcome {
    /// Same hit ids in the same order
    Equal,
    Diff,
    /// Shadow search failed; the active result was still returned
    Error,
}

impl ShadowOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShadowOutcome::Equal => "equal",
            ShadowOutcome::Diff => "diff",
            ShadowOutcome::Error => "error",
        }
    }
}

/// Sink for comparison outcomes
///
/// Injected into the dashboard service; nothing is registered globally.
#[async_trait]
pub trait SearchMetrics: Send + Sync {
    async fn record_comparison(&self, outcome: ShadowOutcome, active: Duration, shadow: Duration);
}

#[derive(Debug, Clone)]
pub struct ComparisonMetric {
    pub outcome: ShadowOutcome,
    pub active_duration: Duration,
    pub shadow_duration: Duration,
    pub timestamp: SystemTime,
}

/// Aggregated timings for one outcome
#[derive(Debug, Clone)]
pub struct ComparisonStats {
    pub outcome: ShadowOutcome,
    pub count: u64,
    pub avg_active: Duration,
    pub avg_shadow: Duration,
    pub p50_active: Duration,
    pub p50_shadow: Duration,
    pub p95_active: Duration,
    pub p95_shadow: Duration,
}

/// Timing samples kept per collector unless configured otherwise
pub const DEFAULT_SAMPLE_WINDOW: usize = 1024;

/// In-memory collector of comparison outcomes
///
/// Outcome counts are exact and only ever grow. Timings are kept for the
/// most recent `window` comparisons only.
#[derive(Debug, Clone)]
pub struct SearchMetricsCollector {
    counts: HashMap<ShadowOutcome, u64>,
    samples: VecDeque<ComparisonMetric>,
    window: usize,
}

impl Default for SearchMetricsCollector {
    fn default() -> Self {
        Self::with_window(DEFAULT_SAMPLE_WINDOW)
    }
}

impl SearchMetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collector keeping at most `window` timing samples (at least one)
    pub fn with_window(window: usize) -> Self {
        let window = window.max(1);
        Self {
            counts: HashMap::new(),
            samples: VecDeque::with_capacity(window),
            window,
        }
    }

    pub fn record(&mut self, outcome: ShadowOutcome, active: Duration, shadow: Duration) {
        *self.counts.entry(outcome).or_insert(0) += 1;

        if self.samples.len() == self.window {
            self.samples.pop_front();
        }
        self.samples.push_back(ComparisonMetric {
            outcome,
            active_duration: active,
            shadow_duration: shadow,
            timestamp: SystemTime::now(),
        });
    }

    /// Most recent timing samples, oldest first
    pub fn metrics(&self) -> &VecDeque<ComparisonMetric> {
        &self.samples
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Number of comparisons that ended in `outcome`
    pub fn count(&self, outcome: ShadowOutcome) -> u64 {
        self.counts.get(&outcome).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Exact count for `outcome` with timings taken from the sample window
    pub fn stats_for(&self, outcome: ShadowOutcome) -> Option<ComparisonStats> {
        let count = self.count(outcome);
        if count == 0 {
            return None;
        }

        let matching: Vec<_> = self.samples.iter().filter(|m| m.outcome == outcome).collect();
        let mut active: Vec<Duration> = matching.iter().map(|m| m.active_duration).collect();
        let mut shadow: Vec<Duration> = matching.iter().map(|m| m.shadow_duration).collect();
        active.sort();
        shadow.sort();

        Some(ComparisonStats {
            outcome,
            count,
            avg_active: average(&active),
            avg_shadow: average(&shadow),
            p50_active: percentile(&active, 50.0),
            p50_shadow: percentile(&shadow, 50.0),
            p95_active: percentile(&active, 95.0),
            p95_shadow: percentile(&shadow, 95.0),
        })
    }

    /// Formatted summary of every outcome seen so far
    pub fn generate_report(&self) -> String {
        let mut report = String::new();
        report.push_str("=== Shadow Search Report ===\n");
        report.push_str(&format!(
            "Comparisons recorded: {} (timings over last {})\n\n",
            self.total(),
            self.samples.len()
        ));

        for outcome in [ShadowOutcome::Equal, ShadowOutcome::Diff, ShadowOutcome::Error] {
            if let Some(stats) = self.stats_for(outcome) {
                report.push_str(&format!("Outcome: {}\n", outcome.as_str()));
                report.push_str(&format!("  Count: {}\n", stats.count));
                report.push_str(&format!(
                    "  Average: {:.2}ms (active) vs {:.2}ms (shadow)\n",
                    stats.avg_active.as_secs_f64() * 1000.0,
                    stats.avg_shadow.as_secs_f64() * 1000.0
                ));
                report.push_str(&format!(
                    "  p50: {:.2}ms vs {:.2}ms\n",
                    stats.p50_active.as_secs_f64() * 1000.0,
                    stats.p50_shadow.as_secs_f64() * 1000.0
                ));
                report.push_str(&format!(
                    "  p95: {:.2}ms vs {:.2}ms\n\n",
                    stats.p95_active.as_secs_f64() * 1000.0,
                    stats.p95_shadow.as_secs_f64() * 1000.0
                ));
            }
        }

        report
    }

    pub fn clear(&mut self) {
        self.counts.clear();
        self.samples.clear();
    }
}

/// [`SearchMetrics`] backed by a shared [`SearchMetricsCollector`]
#[derive(Debug, Default)]
pub struct SharedSearchMetrics {
    collector: Mutex<SearchMetricsCollector>,
}

impl SharedSearchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(window: usize) -> Self {
        Self {
            collector: Mutex::new(SearchMetricsCollector::with_window(window)),
        }
    }

    pub async fn snapshot(&self) -> SearchMetricsCollector {
        self.collector.lock().await.clone()
    }

    pub async fn generate_report(&self) -> String {
        self.collector.lock().await.generate_report()
    }
}

#[async_trait]
impl SearchMetrics for SharedSearchMetrics {
    async fn record_comparison(&self, outcome: ShadowOutcome, active: Duration, shadow: Duration) {
        self.collector.lock().await.record(outcome, active, shadow);
    }
}

fn average(durations: &[Duration]) -> Duration {
    if durations.is_empty() {
        return Duration::ZERO;
    }
    let total: u128 = durations.iter().map(|d| d.as_nanos()).sum();
    Duration::from_nanos((total / durations.len() as u128) as u64)
}

/// Calculate percentile from sorted durations
fn percentile(sorted_durations: &[Duration], percentile: f64) -> Duration {
    if sorted_durations.is_empty() {
        return Duration::from_nanos(0);
    }

    let index = ((percentile / 100.0) * (sorted_durations.len() as f64 - 1.0)).round() as usize;
    sorted_durations[index.min(sorted_durations.len() - 1)]
}
