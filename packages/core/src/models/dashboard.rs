//! Dashboard records and the small projections returned by lookups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Folder id of dashboards that live at the root ("General")
pub const ROOT_FOLDER_ID: i64 = 0;

/// A persisted dashboard; folders are dashboards with `is_folder = true`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub id: i64,
    pub uid: String,
    pub slug: String,
    pub org_id: i64,
    /// Containing folder, [`ROOT_FOLDER_ID`] at the root
    pub folder_id: i64,
    pub is_folder: bool,
    /// Dashboard carries its own ACL; role defaults no longer apply
    pub has_acl: bool,
    pub title: String,
    pub plugin_id: String,
    pub version: i64,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Dashboard {
    /// Column list matching [`crate::services::row_to_dashboard`]
    pub const COLUMNS: &'static str =
        "id, uid, slug, org_id, folder_id, is_folder, has_acl, title, plugin_id, version, created, updated";

    /// Access-control scope of this record (`folders:id:N` or `dashboards:id:N`)
    pub fn scope(&self) -> String {
        if self.is_folder {
            folder_scope(self.id)
        } else {
            dashboard_scope(self.id)
        }
    }
}

/// uid and slug of a dashboard, resolved from its numeric id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardRef {
    pub uid: String,
    pub slug: String,
}

/// One entry of the org-wide tag cloud
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardTagCloudItem {
    pub term: String,
    pub count: i64,
}

pub fn dashboard_url(app_sub_url: &str, uid: &str, slug: &str) -> String {
    format!("{}/d/{}/{}", app_sub_url, uid, slug)
}

pub fn folder_url(app_sub_url: &str, uid: &str, slug: &str) -> String {
    format!("{}/dashboards/f/{}/{}", app_sub_url, uid, slug)
}

pub fn dashboard_folder_url(app_sub_url: &str, is_folder: bool, uid: &str, slug: &str) -> String {
    if is_folder {
        folder_url(app_sub_url, uid, slug)
    } else {
        dashboard_url(app_sub_url, uid, slug)
    }
}

pub fn dashboard_scope(id: i64) -> String {
    format!("dashboards:id:{}", id)
}

pub fn folder_scope(id: i64) -> String {
    format!("folders:id:{}", id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        assert_eq!(dashboard_url("", "abc", "cpu"), "/d/abc/cpu");
        assert_eq!(
            folder_url("/grafana", "f1", "ops"),
            "/grafana/dashboards/f/f1/ops"
        );
        assert_eq!(dashboard_folder_url("", true, "f1", "ops"), "/dashboards/f/f1/ops");
        assert_eq!(dashboard_folder_url("", false, "d1", "cpu"), "/d/d1/cpu");
    }

    #[test]
    fn test_scopes() {
        assert_eq!(dashboard_scope(7), "dashboards:id:7");
        assert_eq!(folder_scope(42), "folders:id:42");
    }
}
