//! Single-record lookups
//!
//! Thin reads around the dashboard table: by id/slug/uid, by id set, by
//! plugin, and the org tag cloud.

use crate::db::{int, text, DatabaseError, DbSession};
use crate::models::{Dashboard, DashboardRef, DashboardTagCloudItem, GetDashboardQuery};
use crate::services::error::DashboardError;
use crate::services::search::filters::placeholders;
use chrono::{DateTime, Utc};
use libsql::Row;

/// Decode a row selected with [`Dashboard::COLUMNS`]
pub fn row_to_dashboard(row: &Row) -> Result<Dashboard, DatabaseError> {
    Ok(Dashboard {
        id: row.get::<i64>(0)?,
        uid: row.get::<String>(1)?,
        slug: row.get::<String>(2)?,
        org_id: row.get::<i64>(3)?,
        folder_id: row.get::<i64>(4)?,
        is_folder: row.get::<i64>(5)? != 0,
        has_acl: row.get::<i64>(6)? != 0,
        title: row.get::<String>(7)?,
        plugin_id: row.get::<String>(8)?,
        version: row.get::<i64>(9)?,
        created: timestamp(row.get::<i64>(10)?),
        updated: timestamp(row.get::<i64>(11)?),
    })
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

/// Load one dashboard matching every identifier set on `query`
pub async fn get_dashboard(
    session: &DbSession,
    query: &GetDashboardQuery,
) -> Result<Dashboard, DashboardError> {
    if !query.has_identifier() {
        return Err(DashboardError::IdentifierNotSet);
    }

    let mut clauses = Vec::new();
    let mut params = Vec::new();
    if query.id != 0 {
        clauses.push("id = ?");
        params.push(int(query.id));
    }
    if !query.slug.is_empty() {
        clauses.push("slug = ?");
        params.push(text(query.slug.as_str()));
    }
    if !query.uid.is_empty() {
        clauses.push("uid = ?");
        params.push(text(query.uid.as_str()));
    }
    if query.org_id != 0 {
        clauses.push("org_id = ?");
        params.push(int(query.org_id));
    }

    let sql = format!(
        "SELECT {} FROM dashboard WHERE {} LIMIT 1",
        Dashboard::COLUMNS,
        clauses.join(" AND ")
    );

    session
        .query_one(&sql, params, row_to_dashboard)
        .await?
        .ok_or(DashboardError::NotFound)
}

pub async fn get_dashboard_uid_by_id(
    session: &DbSession,
    id: i64,
) -> Result<DashboardRef, DashboardError> {
    session
        .query_one("SELECT uid, slug FROM dashboard WHERE id = ?", vec![int(id)], |row| {
            Ok(DashboardRef {
                uid: row.get::<String>(0)?,
                slug: row.get::<String>(1)?,
            })
        })
        .await?
        .ok_or(DashboardError::NotFound)
}

pub async fn get_dashboard_slug_by_id(session: &DbSession, id: i64) -> Result<String, DashboardError> {
    session
        .query_one("SELECT slug FROM dashboard WHERE id = ?", vec![int(id)], |row| {
            Ok(row.get::<String>(0)?)
        })
        .await?
        .ok_or(DashboardError::NotFound)
}

/// Dashboards with the given ids; ids that do not exist are skipped
pub async fn get_dashboards(session: &DbSession, ids: &[i64]) -> Result<Vec<Dashboard>, DashboardError> {
    if ids.is_empty() {
        return Err(DashboardError::validation_failed("no dashboard ids given"));
    }

    let sql = format!(
        "SELECT {} FROM dashboard WHERE id IN ({}) ORDER BY id",
        Dashboard::COLUMNS,
        placeholders(ids.len())
    );
    let params = ids.iter().map(|id| int(*id)).collect();

    Ok(session.query_map(&sql, params, row_to_dashboard).await?)
}

/// Non-folder dashboards installed by a plugin
pub async fn get_dashboards_by_plugin_id(
    session: &DbSession,
    org_id: i64,
    plugin_id: &str,
) -> Result<Vec<Dashboard>, DashboardError> {
    let sql = format!(
        "SELECT {} FROM dashboard WHERE org_id = ? AND plugin_id = ? AND is_folder = 0 ORDER BY id",
        Dashboard::COLUMNS
    );

    Ok(session
        .query_map(&sql, vec![int(org_id), text(plugin_id)], row_to_dashboard)
        .await?)
}

/// Tag terms used in the org with their dashboard counts, ordered by term
pub async fn get_dashboard_tags(
    session: &DbSession,
    org_id: i64,
) -> Result<Vec<DashboardTagCloudItem>, DashboardError> {
    let sql = "SELECT COUNT(*) AS count, term
               FROM dashboard
               INNER JOIN dashboard_tag ON dashboard_tag.dashboard_id = dashboard.id
               WHERE dashboard.org_id = ?
               GROUP BY term
               ORDER BY term";

    Ok(session
        .query_map(sql, vec![int(org_id)], |row| {
            Ok(DashboardTagCloudItem {
                count: row.get::<i64>(0)?,
                term: row.get::<String>(1)?,
            })
        })
        .await?)
}
