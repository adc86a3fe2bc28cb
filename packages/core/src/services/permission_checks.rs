//! Folder permission checks and per-dashboard effective permissions.

use crate::db::{boolean, int, DbSession};
use crate::models::{DashboardPermissionForUser, OrgRole, PermissionLevel, SignedInUser};
use crate::services::error::DashboardError;
use crate::services::search::builder::build_folder_count;
use crate::services::search::filters::placeholders;
use crate::services::search::permissions::{PermissionFilter, PermissionStrategy};

/// Org role that grants `level` on every folder without a lookup
fn role_for(level: PermissionLevel) -> OrgRole {
    match level {
        PermissionLevel::View => OrgRole::Viewer,
        PermissionLevel::Edit => OrgRole::Editor,
        PermissionLevel::Admin => OrgRole::Admin,
    }
}

/// Whether `user` holds `level` on at least one folder of their org
///
/// Uses the same permission predicate as search, restricted to folders.
pub async fn has_permission_in_folders(
    session: &DbSession,
    strategy: PermissionStrategy,
    user: &SignedInUser,
    level: PermissionLevel,
) -> Result<bool, DashboardError> {
    if user.has_role(role_for(level)) {
        return Ok(true);
    }

    let filter = PermissionFilter::new(strategy, user, level);
    let query = build_folder_count(user.org_id, &filter);

    let count = session
        .query_one(&query.sql, query.params, |row| Ok(row.get::<i64>(0)?))
        .await?
        .unwrap_or(0);

    tracing::debug!(user_id = user.user_id, level = level.name(), count, "folder permission count");
    Ok(count > 0)
}

/// Highest permission `user_id` holds on each of `dashboard_ids`
///
/// Dashboards the user has no permission on are absent from the result.
/// Org admins get Admin on every id without a query.
pub async fn get_dashboard_permissions_for_user(
    session: &DbSession,
    org_id: i64,
    user_id: i64,
    org_role: OrgRole,
    dashboard_ids: &[i64],
) -> Result<Vec<DashboardPermissionForUser>, DashboardError> {
    if dashboard_ids.is_empty() {
        return Err(DashboardError::validation_failed("no dashboard ids given"));
    }

    if org_role == OrgRole::Admin {
        return Ok(dashboard_ids
            .iter()
            .map(|id| DashboardPermissionForUser::new(*id, PermissionLevel::Admin))
            .collect());
    }

    // ACL rows apply when the dashboard (or its folder) has its own ACL,
    // the user's org role applies otherwise
    let sql = format!(
        "SELECT d.id AS dashboard_id, MAX(COALESCE(da.permission, pt.permission)) AS permission
         FROM dashboard AS d
             LEFT JOIN dashboard_acl AS da ON d.folder_id = da.dashboard_id OR d.id = da.dashboard_id
             LEFT JOIN team_member AS ugm ON ugm.team_id = da.team_id
             LEFT JOIN org_user AS ou ON ou.role = da.role AND ou.user_id = ? AND ou.org_id = d.org_id
             LEFT JOIN org_user AS ou_role ON ou_role.user_id = ? AND ou_role.org_id = ?
             LEFT JOIN (SELECT 1 AS permission, 'Viewer' AS role
                 UNION SELECT 2 AS permission, 'Editor' AS role
                 UNION SELECT 4 AS permission, 'Admin' AS role) AS pt ON ou_role.role = pt.role
         WHERE
             d.id IN ({}) AND
             d.org_id = ? AND
             (
                 (d.has_acl = ? AND (da.user_id = ? OR ugm.user_id = ? OR ou.id IS NOT NULL))
                 OR (d.has_acl = ? AND ou_role.id IS NOT NULL)
             )
         GROUP BY d.id
         ORDER BY d.id ASC",
        placeholders(dashboard_ids.len())
    );

    let mut params = vec![int(user_id), int(user_id), int(org_id)];
    params.extend(dashboard_ids.iter().map(|id| int(*id)));
    params.extend([
        int(org_id),
        boolean(true),
        int(user_id),
        int(user_id),
        boolean(false),
    ]);

    let rows = session
        .query_map(&sql, params, |row| Ok((row.get::<i64>(0)?, row.get::<i64>(1)?)))
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(id, permission)| match PermissionLevel::from_i64(permission) {
            Some(level) => Some(DashboardPermissionForUser::new(id, level)),
            None => {
                tracing::warn!(dashboard_id = id, permission, "unknown permission level");
                None
            }
        })
        .collect())
}
