//! Panelstore Core
//!
//! Persistence layer for dashboards organized into folders: a
//! permission-aware search that composes filters into one paged SQL
//! statement, and a transactional cascade that deletes a dashboard or a
//! folder with everything that references it.
//!
//! # Architecture
//!
//! - **libsql**: Embedded SQLite-compatible database
//! - **Two permission strategies**: legacy ACL rows or access-control
//!   scopes, selected per call by the `accesscontrol` feature toggle
//! - **Shadow search**: optionally compares both strategies on live traffic
//!
//! # Modules
//!
//! - [`models`] - Dashboards, users, search queries and hits
//! - [`services`] - DashboardService, search and delete
//! - [`db`] - Database layer with libsql integration
//! - [`config`] - Store configuration and feature toggles

pub mod config;
pub mod db;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use config::StoreConfig;
pub use models::*;
pub use services::*;
