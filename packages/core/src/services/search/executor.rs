//! Search executor
//!
//! Runs a built search statement and folds the (dashboard, tag) rows into
//! one [`Hit`] per dashboard. Output order is first-seen row order, i.e. the
//! statement's ORDER BY.

use crate::db::{nullable_int, nullable_text, DatabaseError, DatabaseService};
use crate::models::{
    dashboard_folder_url, folder_url, FindPersistedDashboardsQuery, Hit, HitType, ROOT_FOLDER_ID,
};
use crate::services::search::builder;
use crate::services::search::filters::Filter;
use crate::services::search::permissions::{PermissionFilter, PermissionStrategy};
use libsql::Row;
use std::collections::HashMap;
use std::sync::Arc;

/// One row of the search statement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSearchProjection {
    pub id: i64,
    pub uid: String,
    pub title: String,
    pub slug: String,
    pub term: String,
    pub is_folder: bool,
    pub folder_id: i64,
    pub folder_uid: String,
    pub folder_slug: String,
    pub folder_title: String,
    pub sort_meta: i64,
}

impl DashboardSearchProjection {
    fn from_row(row: &Row, with_sort_meta: bool) -> Result<Self, DatabaseError> {
        Ok(Self {
            id: row.get::<i64>(0)?,
            uid: nullable_text(row, 1)?.unwrap_or_default(),
            title: nullable_text(row, 2)?.unwrap_or_default(),
            slug: nullable_text(row, 3)?.unwrap_or_default(),
            term: nullable_text(row, 4)?.unwrap_or_default(),
            is_folder: row.get::<i64>(5)? != 0,
            folder_id: nullable_int(row, 6)?.unwrap_or(ROOT_FOLDER_ID),
            folder_uid: nullable_text(row, 7)?.unwrap_or_default(),
            folder_slug: nullable_text(row, 8)?.unwrap_or_default(),
            folder_title: nullable_text(row, 9)?.unwrap_or_default(),
            sort_meta: if with_sort_meta {
                nullable_int(row, 10)?.unwrap_or_default()
            } else {
                0
            },
        })
    }
}

/// Read-only search over the dashboard table
#[derive(Debug, Clone)]
pub struct SearchExecutor {
    db: Arc<DatabaseService>,
    app_sub_url: String,
}

impl SearchExecutor {
    pub fn new(db: Arc<DatabaseService>, app_sub_url: impl Into<String>) -> Self {
        Self {
            db,
            app_sub_url: app_sub_url.into(),
        }
    }

    /// Search with the filters derived from `query`
    pub async fn find(
        &self,
        query: &FindPersistedDashboardsQuery,
        strategy: PermissionStrategy,
    ) -> Result<Vec<Hit>, DatabaseError> {
        let filters = query_filters(query, strategy);
        self.search(&filters, query.limit, query.page).await
    }

    /// Run the statement built from `filters` and fold its rows
    pub async fn search(
        &self,
        filters: &[Filter],
        limit: i64,
        page: i64,
    ) -> Result<Vec<Hit>, DatabaseError> {
        let sort_meta_name = filters.iter().find_map(|f| match f {
            Filter::Sort(sort) => sort.meta_name(),
            _ => None,
        });

        let query = builder::build(filters, limit, page);
        let session = self.db.session().await?;
        let rows = session
            .query_map(&query.sql, query.params, |row| {
                DashboardSearchProjection::from_row(row, sort_meta_name.is_some())
            })
            .await?;

        tracing::debug!(rows = rows.len(), "search statement returned");
        Ok(fold_hits(rows, sort_meta_name, &self.app_sub_url))
    }
}

/// Fold projection rows into hits, one per dashboard id
///
/// Every non-empty term is appended, so a term repeated by the join shows
/// up repeatedly on the hit.
pub fn fold_hits(
    rows: Vec<DashboardSearchProjection>,
    sort_meta_name: Option<&str>,
    app_sub_url: &str,
) -> Vec<Hit> {
    let mut hits: Vec<Hit> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for row in rows {
        let position = match index.get(&row.id).copied() {
            Some(position) => position,
            None => {
                hits.push(new_hit(&row, sort_meta_name, app_sub_url));
                index.insert(row.id, hits.len() - 1);
                hits.len() - 1
            }
        };

        if !row.term.is_empty() {
            hits[position].tags.push(row.term);
        }
    }

    hits
}

fn new_hit(row: &DashboardSearchProjection, sort_meta_name: Option<&str>, app_sub_url: &str) -> Hit {
    let hit_type = if row.is_folder {
        HitType::Folder
    } else {
        HitType::Dashboard
    };

    let folder_url = if row.folder_id > ROOT_FOLDER_ID {
        folder_url(app_sub_url, &row.folder_uid, &row.folder_slug)
    } else {
        String::new()
    };

    let (sort_meta, sort_meta_name) = match sort_meta_name {
        Some(name) => (row.sort_meta, name.to_string()),
        None => (0, String::new()),
    };

    Hit {
        id: row.id,
        uid: row.uid.clone(),
        title: row.title.clone(),
        uri: format!("db/{}", row.slug),
        url: dashboard_folder_url(app_sub_url, row.is_folder, &row.uid, &row.slug),
        slug: row.slug.clone(),
        hit_type,
        tags: Vec::new(),
        is_starred: false,
        folder_id: row.folder_id,
        folder_uid: row.folder_uid.clone(),
        folder_title: row.folder_title.clone(),
        folder_url,
        sort_meta,
        sort_meta_name,
    }
}

/// Filters for a search request, in application order
pub fn query_filters(query: &FindPersistedDashboardsQuery, strategy: PermissionStrategy) -> Vec<Filter> {
    let user = &query.signed_in_user;
    let mut filters = vec![
        Filter::Permission(PermissionFilter::new(strategy, user, query.permission)),
        Filter::Sort(query.sort),
    ];

    let org_id = if query.org_id != 0 {
        query.org_id
    } else {
        user.org_id
    };
    if org_id != 0 {
        filters.push(Filter::Org(org_id));
    }

    if !query.tags.is_empty() {
        filters.push(Filter::Tags(query.tags.clone()));
    }

    if !query.dashboard_ids.is_empty() {
        filters.push(Filter::Dashboards(query.dashboard_ids.clone()));
    }

    if query.is_starred {
        filters.push(Filter::Starred {
            user_id: user.user_id,
        });
    }

    if !query.title.is_empty() {
        filters.push(Filter::Title(query.title.clone()));
    }

    if let Some(hit_type) = query.hit_type {
        filters.push(Filter::Type(hit_type));
    }

    if !query.folder_ids.is_empty() {
        filters.push(Filter::Folders(query.folder_ids.clone()));
    }

    filters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OrgRole, SignedInUser, SortOption};

    fn row(id: i64, title: &str, term: &str) -> DashboardSearchProjection {
        DashboardSearchProjection {
            id,
            uid: format!("uid{}", id),
            title: title.to_string(),
            slug: title.to_lowercase(),
            term: term.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_fold_accumulates_tags_in_row_order() {
        let rows = vec![
            row(1, "A", "x"),
            row(1, "A", "y"),
            row(2, "B", ""),
            row(1, "A", "z"),
        ];
        let hits = fold_hits(rows, None, "");

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, 1);
        assert_eq!(hits[0].tags, vec!["x", "y", "z"]);
        assert_eq!(hits[1].id, 2);
        assert!(hits[1].tags.is_empty());
    }

    #[test]
    fn test_fold_one_hit_per_dashboard_in_first_seen_order() {
        let rows = vec![
            row(1, "dash", ""),
            row(1, "dash", "a"),
            row(1, "dash", "b"),
            row(2, "dash2", ""),
        ];
        let hits = fold_hits(rows, None, "");

        assert_eq!(hits.iter().map(|h| h.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(hits[0].tags, vec!["a", "b"]);
        assert!(hits[1].tags.is_empty());
    }

    #[test]
    fn test_fold_keeps_duplicate_terms() {
        let rows = vec![row(5, "Net", "prod"), row(5, "Net", "prod")];
        let hits = fold_hits(rows, None, "");
        assert_eq!(hits[0].tags, vec!["prod", "prod"]);
    }

    #[test]
    fn test_fold_builds_urls_and_folder_context() {
        let mut child = row(3, "Cpu", "");
        child.folder_id = 9;
        child.folder_uid = "f9".to_string();
        child.folder_slug = "ops".to_string();
        child.folder_title = "Ops".to_string();

        let mut folder = row(9, "Ops", "");
        folder.is_folder = true;

        let hits = fold_hits(vec![folder, child], None, "/grafana");

        assert_eq!(hits[0].hit_type, HitType::Folder);
        assert_eq!(hits[0].url, "/grafana/dashboards/f/uid9/ops");
        assert_eq!(hits[0].folder_url, "");

        assert_eq!(hits[1].hit_type, HitType::Dashboard);
        assert_eq!(hits[1].uri, "db/cpu");
        assert_eq!(hits[1].url, "/grafana/d/uid3/cpu");
        assert_eq!(hits[1].folder_url, "/grafana/dashboards/f/f9/ops");
        assert_eq!(hits[1].folder_title, "Ops");
    }

    #[test]
    fn test_sort_meta_only_with_name() {
        let mut r = row(1, "A", "");
        r.sort_meta = 1_600_000_000;

        let hits = fold_hits(vec![r.clone()], None, "");
        assert_eq!(hits[0].sort_meta, 0);
        assert_eq!(hits[0].sort_meta_name, "");

        let hits = fold_hits(vec![r], Some("created"), "");
        assert_eq!(hits[0].sort_meta, 1_600_000_000);
        assert_eq!(hits[0].sort_meta_name, "created");
    }

    #[test]
    fn test_empty_rows_yield_no_hits() {
        assert!(fold_hits(Vec::new(), None, "").is_empty());
    }

    #[test]
    fn test_query_filters_order() {
        let user = SignedInUser::new(2, 1, OrgRole::Viewer);
        let mut query = FindPersistedDashboardsQuery::new(user);
        query.title = "cpu".to_string();
        query.tags = vec!["prod".to_string()];
        query.is_starred = true;
        query.folder_ids = vec![0];
        query.sort = SortOption::CreatedAsc;

        let filters = query_filters(&query, PermissionStrategy::Legacy);
        let kinds: Vec<&str> = filters
            .iter()
            .map(|f| match f {
                Filter::Permission(_) => "permission",
                Filter::Sort(_) => "sort",
                Filter::Org(_) => "org",
                Filter::Tags(_) => "tags",
                Filter::Dashboards(_) => "dashboards",
                Filter::Starred { .. } => "starred",
                Filter::Title(_) => "title",
                Filter::Type(_) => "type",
                Filter::Folders(_) => "folders",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["permission", "sort", "org", "tags", "starred", "title", "folders"]
        );
    }

    #[test]
    fn test_explicit_org_overrides_user_org() {
        let mut query = FindPersistedDashboardsQuery::new(SignedInUser::new(2, 1, OrgRole::Viewer));
        query.org_id = 7;
        let filters = query_filters(&query, PermissionStrategy::AccessControl);
        assert!(filters.iter().any(|f| matches!(f, Filter::Org(7))));
    }
}
