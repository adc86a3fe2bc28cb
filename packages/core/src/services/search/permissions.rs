//! Permission filter
//!
//! Two interchangeable strategies restrict which dashboards a user sees:
//!
//! - **Legacy**: org role plus `dashboard_acl` rows (user, team or role
//!   grants, folder grants inherited by children, role defaults for
//!   dashboards without their own ACL). Org admins are not filtered.
//! - **AccessControl**: scopes precomputed per action on the signed-in user
//!   (`dashboards:id:7`, `folders:id:3`, wildcards).
//!
//! The same predicate is used for search and for the folder permission
//! checks so the two cannot drift apart.

use crate::config::StoreConfig;
use crate::db::int;
use crate::models::{OrgRole, PermissionLevel, SignedInUser};
use crate::services::search::filters::{placeholders, Fragment};

pub const ACTION_DASHBOARDS_READ: &str = "dashboards:read";
pub const ACTION_DASHBOARDS_WRITE: &str = "dashboards:write";
pub const ACTION_DASHBOARDS_CREATE: &str = "dashboards:create";
pub const ACTION_DASHBOARDS_PERMISSIONS_WRITE: &str = "dashboards.permissions:write";
pub const ACTION_FOLDERS_READ: &str = "folders:read";
pub const ACTION_FOLDERS_PERMISSIONS_WRITE: &str = "folders.permissions:write";

/// Which permission model a call filters with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionStrategy {
    Legacy,
    AccessControl,
}

impl PermissionStrategy {
    pub fn from_config(config: &StoreConfig) -> Self {
        if config.access_control_enabled() {
            PermissionStrategy::AccessControl
        } else {
            PermissionStrategy::Legacy
        }
    }

    /// The strategy that is not active, used for shadow comparison
    pub fn other(self) -> Self {
        match self {
            PermissionStrategy::Legacy => PermissionStrategy::AccessControl,
            PermissionStrategy::AccessControl => PermissionStrategy::Legacy,
        }
    }
}

#[derive(Debug, Clone)]
pub enum PermissionFilter {
    Legacy {
        org_id: i64,
        user_id: i64,
        org_role: OrgRole,
        level: PermissionLevel,
    },
    AccessControl {
        user: SignedInUser,
        level: PermissionLevel,
    },
}

impl PermissionFilter {
    pub fn new(strategy: PermissionStrategy, user: &SignedInUser, level: PermissionLevel) -> Self {
        match strategy {
            PermissionStrategy::Legacy => PermissionFilter::Legacy {
                org_id: user.org_id,
                user_id: user.user_id,
                org_role: user.org_role,
                level,
            },
            PermissionStrategy::AccessControl => PermissionFilter::AccessControl {
                user: user.clone(),
                level,
            },
        }
    }

    pub fn strategy(&self) -> PermissionStrategy {
        match self {
            PermissionFilter::Legacy { .. } => PermissionStrategy::Legacy,
            PermissionFilter::AccessControl { .. } => PermissionStrategy::AccessControl,
        }
    }

    /// WHERE fragment over the `dashboard` table; `None` means unrestricted
    pub fn predicate(&self) -> Option<Fragment> {
        match self {
            PermissionFilter::Legacy {
                org_id,
                user_id,
                org_role,
                level,
            } => legacy_predicate(*org_id, *user_id, *org_role, *level),
            PermissionFilter::AccessControl { user, level } => {
                Some(access_control_predicate(user, *level))
            }
        }
    }
}

fn legacy_predicate(
    org_id: i64,
    user_id: i64,
    org_role: OrgRole,
    level: PermissionLevel,
) -> Option<Fragment> {
    if org_role == OrgRole::Admin {
        return None;
    }

    let roles = org_role.acl_roles();
    let role_list = placeholders(roles.len());

    let sql = format!(
        "dashboard.id IN (
            SELECT DISTINCT dashboard_id FROM (
                SELECT d.id AS dashboard_id
                    FROM dashboard AS d
                    LEFT JOIN dashboard_acl AS da ON
                        da.dashboard_id = d.id OR
                        da.dashboard_id = d.folder_id
                    WHERE
                        d.org_id = ? AND
                        da.permission >= ? AND
                        (
                            da.user_id = ? OR
                            da.team_id IN (SELECT team_id FROM team_member AS tm WHERE tm.user_id = ?) OR
                            da.role IN ({roles})
                        )
                UNION
                SELECT d.id AS dashboard_id
                    FROM dashboard AS d
                    LEFT JOIN dashboard AS folder ON folder.id = d.folder_id
                    LEFT JOIN dashboard_acl AS da ON
                        (
                            da.org_id = -1 AND (
                                (folder.id IS NOT NULL AND folder.has_acl = 0) OR
                                (folder.id IS NULL AND d.has_acl = 0)
                            )
                        )
                    WHERE
                        d.org_id = ? AND
                        da.permission >= ? AND
                        (
                            da.user_id = ? OR
                            da.role IN ({roles})
                        )
            ) AS a
        )",
        roles = role_list
    );

    let role_params = roles.iter().map(|r| crate::db::text(r.as_str()));

    let mut params = vec![
        int(org_id),
        int(level.as_i64()),
        int(user_id),
        int(user_id),
    ];
    params.extend(role_params.clone());
    params.extend([int(org_id), int(level.as_i64()), int(user_id)]);
    params.extend(role_params);

    Some(Fragment::new(sql, params))
}

/// Actions checked on dashboards and on folders for a permission level
fn actions_for(level: PermissionLevel) -> (&'static str, &'static str) {
    match level {
        PermissionLevel::View => (ACTION_DASHBOARDS_READ, ACTION_FOLDERS_READ),
        PermissionLevel::Edit => (ACTION_DASHBOARDS_WRITE, ACTION_DASHBOARDS_CREATE),
        PermissionLevel::Admin => (
            ACTION_DASHBOARDS_PERMISSIONS_WRITE,
            ACTION_FOLDERS_PERMISSIONS_WRITE,
        ),
    }
}

fn access_control_predicate(user: &SignedInUser, level: PermissionLevel) -> Fragment {
    let (dashboard_action, folder_action) = actions_for(level);

    let dashboards = scope_filter(user, dashboard_action, "dashboard.id", "dashboards");
    let parent_folders = scope_filter(user, dashboard_action, "dashboard.folder_id", "folders");
    let folders = scope_filter(user, folder_action, "dashboard.id", "folders");

    let sql = format!(
        "(({} OR {}) AND dashboard.is_folder = 0) OR ({} AND dashboard.is_folder = 1)",
        dashboards.sql, parent_folders.sql, folders.sql
    );

    let mut params = dashboards.params;
    params.extend(parent_folders.params);
    params.extend(folders.params);

    Fragment::new(sql, params)
}

/// Restrict `column` to the ids granted by `kind:id:N` scopes for `action`
fn scope_filter(user: &SignedInUser, action: &str, column: &str, kind: &str) -> Fragment {
    let scopes = user.scopes(action);
    let prefix = format!("{}:id:", kind);

    let wildcard = scopes
        .iter()
        .any(|s| s == "*" || *s == format!("{}:*", kind) || *s == format!("{}*", prefix));
    if wildcard {
        return Fragment::new("1 = 1", Vec::new());
    }

    let ids: Vec<i64> = scopes
        .iter()
        .filter_map(|s| s.strip_prefix(prefix.as_str()))
        .filter_map(|id| id.parse().ok())
        .collect();

    if ids.is_empty() {
        return Fragment::new("1 = 0", Vec::new());
    }

    Fragment::new(
        format!("{} IN ({})", column, placeholders(ids.len())),
        ids.into_iter().map(int).collect(),
    )
}
