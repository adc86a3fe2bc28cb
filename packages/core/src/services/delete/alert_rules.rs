//! Alert rules stored under a folder
//!
//! Alert rules are owned by the alerting subsystem and keyed by the folder
//! uid ("namespace"). The cascade only asks whether any exist and, when
//! forced, removes them together with their versions.

use crate::db::{int, DatabaseError, DbSession};
use async_trait::async_trait;

/// Alert-rule storage as seen by the delete cascade
///
/// Runs on the cascade's session so it shares its transaction.
#[async_trait]
pub trait AlertRuleStore: Send + Sync {
    /// Whether any alert rule lives in the folder's namespace
    async fn namespace_has_rules(&self, session: &DbSession, folder_id: i64) -> Result<bool, DatabaseError>;

    /// Delete every alert rule and rule version in the folder's namespace
    async fn delete_namespace_rules(&self, session: &DbSession, folder_id: i64) -> Result<(), DatabaseError>;
}

/// [`AlertRuleStore`] over the `alert_rule` and `alert_rule_version` tables
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlAlertRuleStore;

#[async_trait]
impl AlertRuleStore for SqlAlertRuleStore {
    async fn namespace_has_rules(&self, session: &DbSession, folder_id: i64) -> Result<bool, DatabaseError> {
        let existing = session
            .query_one(
                "SELECT id FROM alert_rule WHERE namespace_uid = (SELECT uid FROM dashboard WHERE id = ?) LIMIT 1",
                vec![int(folder_id)],
                |row| Ok(row.get::<i64>(0)?),
            )
            .await?;
        Ok(existing.is_some())
    }

    async fn delete_namespace_rules(&self, session: &DbSession, folder_id: i64) -> Result<(), DatabaseError> {
        let rules = session
            .execute(
                "DELETE FROM alert_rule WHERE namespace_uid = (SELECT uid FROM dashboard WHERE id = ?)",
                vec![int(folder_id)],
            )
            .await?;
        let versions = session
            .execute(
                "DELETE FROM alert_rule_version WHERE rule_namespace_uid = (SELECT uid FROM dashboard WHERE id = ?)",
                vec![int(folder_id)],
            )
            .await?;

        tracing::debug!(folder_id, rules, versions, "deleted folder alert rules");
        Ok(())
    }
}
