//! Delete cascade steps
//!
//! A delete is planned as an ordered list of [`DeleteStep`]s and run inside
//! one transaction. The dashboard row itself goes in [`DeleteStep::Dependents`];
//! a folder's children are bulk-deleted last, after everything keyed on
//! them through subqueries is gone.

use crate::db::{int, text, DatabaseError, DbSession};
use crate::models::{dashboard_scope, Dashboard};
use crate::services::delete::alert_rules::AlertRuleStore;
use crate::services::error::DashboardError;

/// How a dependent delete binds the dashboard id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdBinding {
    Integer,
    /// playlist_item.value holds the id as text
    Text,
}

impl IdBinding {
    fn bind(self, id: i64) -> libsql::Value {
        match self {
            IdBinding::Integer => int(id),
            IdBinding::Text => text(id.to_string()),
        }
    }
}

/// Dependent rows of one dashboard, in deletion order
const DEPENDENT_DELETES: &[(&str, IdBinding)] = &[
    ("DELETE FROM dashboard_tag WHERE dashboard_id = ?", IdBinding::Integer),
    ("DELETE FROM star WHERE dashboard_id = ?", IdBinding::Integer),
    ("DELETE FROM dashboard WHERE id = ?", IdBinding::Integer),
    (
        "DELETE FROM playlist_item WHERE type = 'dashboard_by_id' AND value = ?",
        IdBinding::Text,
    ),
    ("DELETE FROM dashboard_version WHERE dashboard_id = ?", IdBinding::Integer),
    ("DELETE FROM annotation WHERE dashboard_id = ?", IdBinding::Integer),
    ("DELETE FROM dashboard_provisioning WHERE dashboard_id = ?", IdBinding::Integer),
    ("DELETE FROM dashboard_acl WHERE dashboard_id = ?", IdBinding::Integer),
];

/// Dependent rows of every child of a folder, keyed by (org_id, folder_id)
const CHILD_DEPENDENT_DELETES: &[&str] = &[
    "DELETE FROM dashboard_tag WHERE dashboard_id IN (SELECT id FROM dashboard WHERE org_id = ? AND folder_id = ?)",
    "DELETE FROM star WHERE dashboard_id IN (SELECT id FROM dashboard WHERE org_id = ? AND folder_id = ?)",
    "DELETE FROM dashboard_version WHERE dashboard_id IN (SELECT id FROM dashboard WHERE org_id = ? AND folder_id = ?)",
    "DELETE FROM annotation WHERE dashboard_id IN (SELECT id FROM dashboard WHERE org_id = ? AND folder_id = ?)",
    "DELETE FROM dashboard_provisioning WHERE dashboard_id IN (SELECT id FROM dashboard WHERE org_id = ? AND folder_id = ?)",
    "DELETE FROM dashboard_acl WHERE dashboard_id IN (SELECT id FROM dashboard WHERE org_id = ? AND folder_id = ?)",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStep {
    /// Legacy alert definitions of every child
    ChildAlertDefinitions,
    /// Access-control grants scoped to the folder
    FolderPermissions,
    /// Access-control grants scoped to each child
    ChildPermissions,
    /// Tags, stars, versions, annotations, provisioning and ACL of the children
    ChildDependents,
    /// Refuse (or, when forced, clear) alert rules in the folder's namespace
    FolderAlertRules { force: bool },
    /// Access-control grants scoped to a plain dashboard
    DashboardPermissions,
    /// Legacy alert definitions of the target itself
    AlertDefinitions,
    /// Dependent rows and the target row
    Dependents,
    /// Bulk delete of the folder's children
    Children,
}

/// The loaded dashboard plus, for folders, its direct children
#[derive(Debug, Clone)]
pub struct DeleteTarget {
    pub dashboard: Dashboard,
    pub child_ids: Vec<i64>,
}

impl DeleteTarget {
    /// Steps for this target, in execution order
    pub fn plan(&self, force_delete_folder_rules: bool) -> Vec<DeleteStep> {
        if !self.dashboard.is_folder {
            return vec![
                DeleteStep::DashboardPermissions,
                DeleteStep::AlertDefinitions,
                DeleteStep::Dependents,
            ];
        }

        let mut steps = vec![
            DeleteStep::ChildAlertDefinitions,
            DeleteStep::FolderPermissions,
            DeleteStep::ChildPermissions,
        ];
        if !self.child_ids.is_empty() {
            steps.push(DeleteStep::ChildDependents);
        }
        steps.extend([
            DeleteStep::FolderAlertRules {
                force: force_delete_folder_rules,
            },
            DeleteStep::AlertDefinitions,
            DeleteStep::Dependents,
            DeleteStep::Children,
        ]);
        steps
    }
}

impl DeleteStep {
    pub async fn run(
        &self,
        session: &DbSession,
        target: &DeleteTarget,
        alert_rules: &dyn AlertRuleStore,
    ) -> Result<(), DashboardError> {
        let dashboard = &target.dashboard;

        match self {
            DeleteStep::ChildAlertDefinitions => {
                for child_id in &target.child_ids {
                    delete_alert_definitions(session, *child_id).await?;
                }
            }
            DeleteStep::FolderPermissions => {
                delete_scoped_permissions(session, &dashboard.scope()).await?;
            }
            DeleteStep::ChildPermissions => {
                for child_id in &target.child_ids {
                    delete_scoped_permissions(session, &dashboard_scope(*child_id)).await?;
                }
            }
            DeleteStep::ChildDependents => {
                for sql in CHILD_DEPENDENT_DELETES {
                    session
                        .execute(sql, vec![int(dashboard.org_id), int(dashboard.id)])
                        .await?;
                }
            }
            DeleteStep::FolderAlertRules { force } => {
                if alert_rules.namespace_has_rules(session, dashboard.id).await? {
                    if !force {
                        tracing::warn!(folder_id = dashboard.id, "folder contains alert rules");
                        return Err(DashboardError::FolderContainsAlertRules);
                    }
                    alert_rules.delete_namespace_rules(session, dashboard.id).await?;
                }
            }
            DeleteStep::DashboardPermissions => {
                delete_scoped_permissions(session, &dashboard.scope()).await?;
            }
            DeleteStep::AlertDefinitions => {
                delete_alert_definitions(session, dashboard.id).await?;
            }
            DeleteStep::Dependents => {
                for (sql, binding) in DEPENDENT_DELETES {
                    session.execute(sql, vec![binding.bind(dashboard.id)]).await?;
                }
            }
            DeleteStep::Children => {
                let deleted = session
                    .execute("DELETE FROM dashboard WHERE folder_id = ?", vec![int(dashboard.id)])
                    .await?;
                tracing::debug!(folder_id = dashboard.id, deleted, "deleted folder children");
            }
        }

        Ok(())
    }
}

async fn delete_scoped_permissions(session: &DbSession, scope: &str) -> Result<(), DatabaseError> {
    session
        .execute("DELETE FROM permission WHERE scope = ?", vec![text(scope)])
        .await?;
    Ok(())
}

/// Delete the legacy alerts of a dashboard with their annotations,
/// notification states and tags
async fn delete_alert_definitions(session: &DbSession, dashboard_id: i64) -> Result<(), DatabaseError> {
    let alert_ids = session
        .query_map(
            "SELECT id FROM alert WHERE dashboard_id = ?",
            vec![int(dashboard_id)],
            |row| Ok(row.get::<i64>(0)?),
        )
        .await?;

    for alert_id in alert_ids {
        session
            .execute("DELETE FROM alert WHERE id = ?", vec![int(alert_id)])
            .await?;
        session
            .execute("DELETE FROM annotation WHERE alert_id = ?", vec![int(alert_id)])
            .await?;
        session
            .execute(
                "DELETE FROM alert_notification_state WHERE alert_id = ?",
                vec![int(alert_id)],
            )
            .await?;
        session
            .execute("DELETE FROM alert_rule_tag WHERE alert_id = ?", vec![int(alert_id)])
            .await?;
        tracing::debug!(dashboard_id, alert_id, "deleted alert definition");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn target(is_folder: bool, child_ids: Vec<i64>) -> DeleteTarget {
        DeleteTarget {
            dashboard: Dashboard {
                id: 10,
                uid: "u10".to_string(),
                slug: "s".to_string(),
                org_id: 1,
                folder_id: 0,
                is_folder,
                has_acl: false,
                title: "T".to_string(),
                plugin_id: String::new(),
                version: 1,
                created: Utc::now(),
                updated: Utc::now(),
            },
            child_ids,
        }
    }

    #[test]
    fn test_plan_for_dashboard() {
        assert_eq!(
            target(false, Vec::new()).plan(true),
            vec![
                DeleteStep::DashboardPermissions,
                DeleteStep::AlertDefinitions,
                DeleteStep::Dependents,
            ]
        );
    }

    #[test]
    fn test_plan_for_folder_with_children() {
        let plan = target(true, vec![11, 12]).plan(false);
        assert_eq!(
            plan,
            vec![
                DeleteStep::ChildAlertDefinitions,
                DeleteStep::FolderPermissions,
                DeleteStep::ChildPermissions,
                DeleteStep::ChildDependents,
                DeleteStep::FolderAlertRules { force: false },
                DeleteStep::AlertDefinitions,
                DeleteStep::Dependents,
                DeleteStep::Children,
            ]
        );
    }

    #[test]
    fn test_empty_folder_skips_child_dependents() {
        let plan = target(true, Vec::new()).plan(true);
        assert!(!plan.contains(&DeleteStep::ChildDependents));
        assert!(plan.contains(&DeleteStep::FolderAlertRules { force: true }));
        assert_eq!(plan.last(), Some(&DeleteStep::Children));
    }

    #[test]
    fn test_dependent_order_deletes_row_after_tags_and_stars() {
        let row = DEPENDENT_DELETES
            .iter()
            .position(|(sql, _)| *sql == "DELETE FROM dashboard WHERE id = ?")
            .unwrap();
        assert_eq!(row, 2);
        assert_eq!(CHILD_DEPENDENT_DELETES.len(), 6);
    }

    #[test]
    fn test_only_playlist_items_bind_id_as_text() {
        let text_bound: Vec<&str> = DEPENDENT_DELETES
            .iter()
            .filter(|(_, binding)| *binding == IdBinding::Text)
            .map(|(sql, _)| *sql)
            .collect();
        assert_eq!(
            text_bound,
            vec!["DELETE FROM playlist_item WHERE type = 'dashboard_by_id' AND value = ?"]
        );
        assert_eq!(IdBinding::Text.bind(10), libsql::Value::Text("10".to_string()));
        assert_eq!(IdBinding::Integer.bind(10), libsql::Value::Integer(10));
    }

    #[test]
    fn test_permission_scope_follows_target_kind() {
        assert_eq!(target(true, Vec::new()).dashboard.scope(), "folders:id:10");
        assert_eq!(target(false, Vec::new()).dashboard.scope(), "dashboards:id:10");
    }
}
