//! Commands and lookup queries accepted by the dashboard service.

use crate::models::PermissionLevel;
use serde::{Deserialize, Serialize};

/// Delete a dashboard, or a folder together with everything in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteDashboardCommand {
    pub id: i64,
    pub org_id: i64,
    /// Also delete alert rules stored under the folder instead of refusing
    #[serde(default)]
    pub force_delete_folder_rules: bool,
}

impl DeleteDashboardCommand {
    pub fn new(id: i64, org_id: i64) -> Self {
        Self {
            id,
            org_id,
            force_delete_folder_rules: false,
        }
    }

    pub fn force(mut self) -> Self {
        self.force_delete_folder_rules = true;
        self
    }
}

/// Look up one dashboard by any combination of id, slug and uid
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetDashboardQuery {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub uid: String,
    pub org_id: i64,
}

impl GetDashboardQuery {
    pub fn has_identifier(&self) -> bool {
        self.id != 0 || !self.slug.is_empty() || !self.uid.is_empty()
    }
}

/// Highest permission a user holds on one dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPermissionForUser {
    pub dashboard_id: i64,
    pub permission: PermissionLevel,
    pub permission_name: String,
}

impl DashboardPermissionForUser {
    pub fn new(dashboard_id: i64, permission: PermissionLevel) -> Self {
        Self {
            dashboard_id,
            permission,
            permission_name: permission.name().to_string(),
        }
    }
}
