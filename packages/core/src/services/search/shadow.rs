//! Shadow search
//!
//! Runs the inactive permission strategy next to the active one and records
//! whether both produced the same hits. The caller always gets the active
//! result.

use crate::models::Hit;
use crate::services::search::metrics::{SearchMetrics, ShadowOutcome};
use crate::services::search::permissions::PermissionStrategy;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct ShadowSearchRunner {
    metrics: Arc<dyn SearchMetrics>,
}

impl ShadowSearchRunner {
    pub fn new(metrics: Arc<dyn SearchMetrics>) -> Self {
        Self { metrics }
    }

    /// Run `search_fn` with `active` and with its counterpart
    ///
    /// An error from the active strategy is returned unchanged and nothing
    /// is recorded. Shadow failures are logged and recorded as
    /// [`ShadowOutcome::Error`].
    pub async fn run<F, Fut, E>(&self, active: PermissionStrategy, search_fn: F) -> Result<Vec<Hit>, E>
    where
        F: Fn(PermissionStrategy) -> Fut,
        Fut: Future<Output = Result<Vec<Hit>, E>>,
        E: std::fmt::Display,
    {
        let start = Instant::now();
        let hits = search_fn(active).await?;
        let active_duration = start.elapsed();

        let shadow = active.other();
        let start = Instant::now();
        let shadow_result = search_fn(shadow).await;
        let shadow_duration = start.elapsed();

        let outcome = match &shadow_result {
            Err(e) => {
                tracing::warn!(strategy = ?shadow, error = %e, "shadow search failed");
                ShadowOutcome::Error
            }
            Ok(shadow_hits) if same_ids(&hits, shadow_hits) => ShadowOutcome::Equal,
            Ok(shadow_hits) => {
                tracing::warn!(
                    active = ?active,
                    active_hits = hits.len(),
                    shadow_hits = shadow_hits.len(),
                    delta_percent = calculate_delta(active_duration, shadow_duration),
                    "shadow search returned different hits"
                );
                ShadowOutcome::Diff
            }
        };

        self.metrics
            .record_comparison(outcome, active_duration, shadow_duration)
            .await;

        Ok(hits)
    }
}

fn same_ids(a: &[Hit], b: &[Hit]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.id == y.id)
}

/// Percentage by which `shadow` is slower than `active`
pub fn calculate_delta(active: Duration, shadow: Duration) -> f64 {
    if active.as_nanos() == 0 {
        return 0.0;
    }
    ((shadow.as_nanos() as f64 - active.as_nanos() as f64) / active.as_nanos() as f64) * 100.0
}
