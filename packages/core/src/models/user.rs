//! Signed-in user, org roles and permission levels.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Organization-wide role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrgRole {
    Viewer,
    Editor,
    Admin,
}

impl OrgRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrgRole::Viewer => "Viewer",
            OrgRole::Editor => "Editor",
            OrgRole::Admin => "Admin",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            OrgRole::Viewer => 1,
            OrgRole::Editor => 2,
            OrgRole::Admin => 3,
        }
    }

    /// Admin includes Editor includes Viewer
    pub fn includes(&self, other: OrgRole) -> bool {
        self.rank() >= other.rank()
    }

    /// Roles whose ACL entries a holder of this role benefits from
    pub fn acl_roles(&self) -> Vec<OrgRole> {
        match self {
            OrgRole::Editor => vec![OrgRole::Editor, OrgRole::Viewer],
            role => vec![*role],
        }
    }
}

/// Permission level of an ACL entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PermissionLevel {
    View = 1,
    Edit = 2,
    Admin = 4,
}

impl PermissionLevel {
    pub fn as_i64(self) -> i64 {
        self as i64
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(PermissionLevel::View),
            2 => Some(PermissionLevel::Edit),
            4 => Some(PermissionLevel::Admin),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PermissionLevel::View => "View",
            PermissionLevel::Edit => "Edit",
            PermissionLevel::Admin => "Admin",
        }
    }
}

/// The user a request runs as
///
/// `permissions` maps an access-control action (e.g. `dashboards:read`) to
/// the scopes granted for it in the user's current org. It is computed by the
/// authorization layer and only read here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedInUser {
    pub user_id: i64,
    pub org_id: i64,
    pub org_role: OrgRole,
    #[serde(default)]
    pub is_server_admin: bool,
    #[serde(default)]
    pub permissions: HashMap<String, Vec<String>>,
}

impl SignedInUser {
    pub fn new(user_id: i64, org_id: i64, org_role: OrgRole) -> Self {
        Self {
            user_id,
            org_id,
            org_role,
            is_server_admin: false,
            permissions: HashMap::new(),
        }
    }

    /// Grant `scopes` for `action`, appending to existing grants
    pub fn with_permission(mut self, action: &str, scopes: &[&str]) -> Self {
        self.permissions
            .entry(action.to_string())
            .or_default()
            .extend(scopes.iter().map(|s| s.to_string()));
        self
    }

    /// Server admins hold every role
    pub fn has_role(&self, role: OrgRole) -> bool {
        self.is_server_admin || self.org_role.includes(role)
    }

    pub fn scopes(&self, action: &str) -> &[String] {
        self.permissions
            .get(action)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
