//! Shared fixtures for the integration tests
//!
//! Seeds rows through a raw connection so fixture statements do not show
//! up in `DatabaseService::statements_executed`.

#![allow(dead_code)]

use anyhow::Result;
use libsql::params::Params;
use libsql::{Connection, Value};
use panelstore_core::db::DatabaseService;
use panelstore_core::{DashboardService, StoreConfig};
use std::sync::Arc;
use tempfile::TempDir;

pub struct TestStore {
    pub db: Arc<DatabaseService>,
    conn: Connection,
    _temp_dir: TempDir,
}

pub async fn setup() -> Result<TestStore> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let db = Arc::new(DatabaseService::new(db_path).await?);
    let conn = db.connect()?;
    Ok(TestStore {
        db,
        conn,
        _temp_dir: temp_dir,
    })
}

fn int(v: i64) -> Value {
    Value::Integer(v)
}

fn text(v: &str) -> Value {
    Value::Text(v.to_string())
}

fn slugify(title: &str) -> String {
    title.to_lowercase().replace(' ', "-")
}

impl TestStore {
    pub fn service(&self) -> Result<DashboardService> {
        Ok(DashboardService::new(self.db.clone(), StoreConfig::default())?)
    }

    pub fn service_with(&self, config: StoreConfig) -> Result<DashboardService> {
        Ok(DashboardService::new(self.db.clone(), config)?)
    }

    pub async fn exec(&self, sql: &str, params: Vec<Value>) -> Result<()> {
        self.conn.execute(sql, Params::Positional(params)).await?;
        Ok(())
    }

    /// First column of the first row as an integer
    pub async fn count(&self, sql: &str, params: Vec<Value>) -> Result<i64> {
        let mut rows = self.conn.query(sql, Params::Positional(params)).await?;
        match rows.next().await? {
            Some(row) => Ok(row.get::<i64>(0)?),
            None => Ok(0),
        }
    }

    async fn insert(
        &self,
        org_id: i64,
        title: &str,
        folder_id: i64,
        is_folder: bool,
        created: i64,
    ) -> Result<i64> {
        let slug = slugify(title);
        self.exec(
            "INSERT INTO dashboard (org_id, title, slug, uid, folder_id, is_folder, created, updated)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            vec![
                int(org_id),
                text(title),
                text(&slug),
                text(&format!("uid-{}-{}", org_id, slug)),
                int(folder_id),
                int(i64::from(is_folder)),
                int(created),
                int(created),
            ],
        )
        .await?;
        Ok(self.conn.last_insert_rowid())
    }

    pub async fn dashboard(&self, org_id: i64, title: &str, folder_id: i64) -> Result<i64> {
        self.insert(org_id, title, folder_id, false, 1_600_000_000).await
    }

    pub async fn dashboard_created(&self, org_id: i64, title: &str, created: i64) -> Result<i64> {
        self.insert(org_id, title, 0, false, created).await
    }

    pub async fn folder(&self, org_id: i64, title: &str) -> Result<i64> {
        self.insert(org_id, title, 0, true, 1_600_000_000).await
    }

    pub async fn uid_of(&self, id: i64) -> Result<String> {
        let mut rows = self
            .conn
            .query("SELECT uid FROM dashboard WHERE id = ?", Params::Positional(vec![int(id)]))
            .await?;
        match rows.next().await? {
            Some(row) => Ok(row.get::<String>(0)?),
            None => anyhow::bail!("no dashboard {}", id),
        }
    }

    pub async fn set_has_acl(&self, id: i64) -> Result<()> {
        self.exec("UPDATE dashboard SET has_acl = 1 WHERE id = ?", vec![int(id)]).await
    }

    pub async fn tag(&self, dashboard_id: i64, term: &str) -> Result<()> {
        self.exec(
            "INSERT INTO dashboard_tag (dashboard_id, term) VALUES (?, ?)",
            vec![int(dashboard_id), text(term)],
        )
        .await
    }

    pub async fn star(&self, user_id: i64, dashboard_id: i64) -> Result<()> {
        self.exec(
            "INSERT INTO star (user_id, dashboard_id) VALUES (?, ?)",
            vec![int(user_id), int(dashboard_id)],
        )
        .await
    }

    pub async fn org_user(&self, org_id: i64, user_id: i64, role: &str) -> Result<()> {
        self.exec(
            "INSERT INTO org_user (org_id, user_id, role) VALUES (?, ?, ?)",
            vec![int(org_id), int(user_id), text(role)],
        )
        .await
    }

    pub async fn team_member(&self, org_id: i64, team_id: i64, user_id: i64) -> Result<()> {
        self.exec(
            "INSERT INTO team_member (org_id, team_id, user_id) VALUES (?, ?, ?)",
            vec![int(org_id), int(team_id), int(user_id)],
        )
        .await
    }

    pub async fn user_acl(&self, org_id: i64, dashboard_id: i64, user_id: i64, permission: i64) -> Result<()> {
        self.exec(
            "INSERT INTO dashboard_acl (org_id, dashboard_id, user_id, permission) VALUES (?, ?, ?, ?)",
            vec![int(org_id), int(dashboard_id), int(user_id), int(permission)],
        )
        .await
    }

    pub async fn team_acl(&self, org_id: i64, dashboard_id: i64, team_id: i64, permission: i64) -> Result<()> {
        self.exec(
            "INSERT INTO dashboard_acl (org_id, dashboard_id, team_id, permission) VALUES (?, ?, ?, ?)",
            vec![int(org_id), int(dashboard_id), int(team_id), int(permission)],
        )
        .await
    }

    pub async fn scoped_permission(&self, scope: &str) -> Result<()> {
        self.exec(
            "INSERT INTO permission (role_id, action, scope) VALUES (1, 'dashboards:read', ?)",
            vec![text(scope)],
        )
        .await
    }

    pub async fn alert_rule(&self, org_id: i64, namespace_uid: &str) -> Result<()> {
        self.exec(
            "INSERT INTO alert_rule (org_id, uid, title, namespace_uid) VALUES (?, 'rule-1', 'High CPU', ?)",
            vec![int(org_id), text(namespace_uid)],
        )
        .await?;
        self.exec(
            "INSERT INTO alert_rule_version (rule_org_id, rule_uid, rule_namespace_uid) VALUES (?, 'rule-1', ?)",
            vec![int(org_id), text(namespace_uid)],
        )
        .await
    }

    /// Every row that hangs off a dashboard, for cascade tests
    pub async fn dependents(&self, org_id: i64, dashboard_id: i64) -> Result<()> {
        self.tag(dashboard_id, "prod").await?;
        self.star(1, dashboard_id).await?;
        self.exec(
            "INSERT INTO playlist_item (playlist_id, type, value) VALUES (1, 'dashboard_by_id', ?)",
            vec![text(&dashboard_id.to_string())],
        )
        .await?;
        self.exec(
            "INSERT INTO dashboard_version (dashboard_id, version) VALUES (?, 1)",
            vec![int(dashboard_id)],
        )
        .await?;
        self.exec(
            "INSERT INTO annotation (org_id, dashboard_id, text) VALUES (?, ?, 'deploy')",
            vec![int(org_id), int(dashboard_id)],
        )
        .await?;
        self.exec(
            "INSERT INTO dashboard_provisioning (dashboard_id, name, external_id) VALUES (?, 'default', 'file.json')",
            vec![int(dashboard_id)],
        )
        .await?;
        self.user_acl(org_id, dashboard_id, 1, 1).await?;
        Ok(())
    }

    /// Total rows referencing `dashboard_id` across the dependent tables
    pub async fn dependent_rows(&self, dashboard_id: i64) -> Result<i64> {
        let mut total = 0;
        for table in [
            "dashboard_tag",
            "star",
            "dashboard_version",
            "annotation",
            "dashboard_provisioning",
            "dashboard_acl",
        ] {
            total += self
                .count(
                    &format!("SELECT COUNT(*) FROM {} WHERE dashboard_id = ?", table),
                    vec![int(dashboard_id)],
                )
                .await?;
        }
        total += self
            .count(
                "SELECT COUNT(*) FROM playlist_item WHERE type = 'dashboard_by_id' AND value = ?",
                vec![text(&dashboard_id.to_string())],
            )
            .await?;
        Ok(total)
    }

    pub async fn exists(&self, id: i64) -> Result<bool> {
        Ok(self
            .count("SELECT COUNT(*) FROM dashboard WHERE id = ?", vec![int(id)])
            .await?
            > 0)
    }
}
