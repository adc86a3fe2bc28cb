//! Dashboard search
//!
//! Filters compose into one paged statement ([`builder`]), the executor
//! runs it and folds rows into hits, and the shadow runner optionally
//! compares the two permission strategies.

pub mod builder;
pub mod executor;
pub mod filters;
pub mod metrics;
pub mod permissions;
pub mod shadow;

pub use builder::{build, build_folder_count, BuiltQuery, Pagination, SearchQueryBuilder, DEFAULT_LIMIT};
pub use executor::{fold_hits, query_filters, DashboardSearchProjection, SearchExecutor};
pub use filters::{Contribution, Filter, Fragment, Join};
pub use metrics::{
    ComparisonMetric, ComparisonStats, SearchMetrics, SearchMetricsCollector, SharedSearchMetrics,
    ShadowOutcome,
};
pub use permissions::{PermissionFilter, PermissionStrategy};
pub use shadow::ShadowSearchRunner;
