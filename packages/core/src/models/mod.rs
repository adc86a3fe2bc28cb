//! Data Models
//!
//! This module contains the data structures shared by the search and delete
//! paths:
//!
//! - `Dashboard` - persisted dashboard or folder record
//! - `SignedInUser` - the caller, with org role and access-control scopes
//! - `Hit` - request-scoped search result projection
//! - Commands and lookup queries accepted by the service layer

mod commands;
mod dashboard;
mod search;
mod user;

pub use commands::{DashboardPermissionForUser, DeleteDashboardCommand, GetDashboardQuery};
pub use dashboard::{
    dashboard_folder_url, dashboard_scope, dashboard_url, folder_scope, folder_url, Dashboard,
    DashboardRef, DashboardTagCloudItem, ROOT_FOLDER_ID,
};
pub use search::{FindPersistedDashboardsQuery, Hit, HitType, SortOption};
pub use user::{OrgRole, PermissionLevel, SignedInUser};
