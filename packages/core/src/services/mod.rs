//! Business Services
//!
//! This module contains the dashboard store's service layer:
//!
//! - `DashboardService` - search, folder permission checks, lookups and delete
//! - `search` - filter composition, query building, row folding and shadow comparison
//! - `delete` - the transactional delete cascade
//!
//! Services coordinate between the database layer and callers; SQL lives
//! here, connection handling lives in `db`.

pub mod dashboard_service;
pub mod delete;
pub mod error;
pub mod lookups;
pub mod permission_checks;
pub mod search;

pub use dashboard_service::DashboardService;
pub use delete::{AlertRuleStore, SqlAlertRuleStore};
pub use error::DashboardError;
pub use lookups::row_to_dashboard;
pub use search::{PermissionStrategy, SearchMetrics, SearchMetricsCollector, SharedSearchMetrics, ShadowOutcome};
