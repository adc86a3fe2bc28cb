//! Cascading delete
//!
//! Deletes a dashboard, or a folder with its direct children, and every row
//! that references them, inside one `BEGIN IMMEDIATE` transaction. Any
//! failure rolls the whole cascade back. Dropping the future mid-cascade
//! drops the connection, which also rolls back.

pub mod alert_rules;
pub mod steps;

pub use alert_rules::{AlertRuleStore, SqlAlertRuleStore};
pub use steps::{DeleteStep, DeleteTarget};

use crate::db::{int, DbSession};
use crate::models::{Dashboard, DeleteDashboardCommand};
use crate::services::error::DashboardError;
use crate::services::lookups::row_to_dashboard;

/// Delete the dashboard named by `cmd` and everything that depends on it
pub async fn delete_dashboard(
    session: &DbSession,
    cmd: &DeleteDashboardCommand,
    alert_rules: &dyn AlertRuleStore,
) -> Result<(), DashboardError> {
    session.begin().await?;

    match run_cascade(session, cmd, alert_rules).await {
        Ok(()) => {
            session.commit().await?;
            tracing::info!(dashboard_id = cmd.id, org_id = cmd.org_id, "dashboard deleted");
            Ok(())
        }
        Err(err) => {
            if let Err(rollback_err) = session.rollback().await {
                tracing::warn!(error = %rollback_err, "rollback after failed delete failed");
            }
            Err(err)
        }
    }
}

async fn run_cascade(
    session: &DbSession,
    cmd: &DeleteDashboardCommand,
    alert_rules: &dyn AlertRuleStore,
) -> Result<(), DashboardError> {
    let target = load_target(session, cmd).await?;
    let plan = target.plan(cmd.force_delete_folder_rules);

    tracing::debug!(
        dashboard_id = target.dashboard.id,
        is_folder = target.dashboard.is_folder,
        children = target.child_ids.len(),
        steps = plan.len(),
        "planned delete"
    );

    for step in plan {
        tracing::debug!(step = ?step, "running delete step");
        step.run(session, &target, alert_rules).await?;
    }

    Ok(())
}

async fn load_target(session: &DbSession, cmd: &DeleteDashboardCommand) -> Result<DeleteTarget, DashboardError> {
    let sql = format!(
        "SELECT {} FROM dashboard WHERE id = ? AND org_id = ?",
        Dashboard::COLUMNS
    );
    let dashboard = session
        .query_one(&sql, vec![int(cmd.id), int(cmd.org_id)], row_to_dashboard)
        .await?
        .ok_or(DashboardError::NotFound)?;

    let child_ids = if dashboard.is_folder {
        session
            .query_map(
                "SELECT id FROM dashboard WHERE folder_id = ?",
                vec![int(dashboard.id)],
                |row| Ok(row.get::<i64>(0)?),
            )
            .await?
    } else {
        Vec::new()
    };

    Ok(DeleteTarget {
        dashboard,
        child_ids,
    })
}
