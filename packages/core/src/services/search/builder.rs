//! Search query builder
//!
//! Two-level statement: an inner query selects the page of matching
//! dashboard ids, the outer query joins those ids back to the dashboard,
//! its folder and its tags. Paging on ids keeps a dashboard with many tags
//! from consuming several slots of the page.

use crate::services::search::filters::{Contribution, Filter, Fragment, Join};
use crate::services::search::permissions::PermissionFilter;
use crate::db::{boolean, int};
use libsql::Value;

pub const DEFAULT_LIMIT: i64 = 1000;

const DEFAULT_ORDER: &str = "dashboard.title ASC";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub page: i64,
}

impl Pagination {
    /// Limits below 1 become [`DEFAULT_LIMIT`], pages below 1 become 1
    pub fn new(limit: i64, page: i64) -> Self {
        Self {
            limit: if limit < 1 { DEFAULT_LIMIT } else { limit },
            page: page.max(1),
        }
    }

    /// Saturates at `i64::MAX` so an oversized page yields an empty page
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// A complete statement ready for the session
#[derive(Debug, Clone)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

#[derive(Debug, Default)]
pub struct SearchQueryBuilder {
    joins: Vec<Join>,
    predicates: Vec<Fragment>,
    group_by: Vec<String>,
    having: Vec<Fragment>,
    order_by: Vec<String>,
    select: Option<String>,
}

impl SearchQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filters(filters: &[Filter]) -> Self {
        let mut builder = Self::new();
        for filter in filters {
            builder.add(filter.contribute());
        }
        builder
    }

    pub fn add(&mut self, contribution: Contribution) {
        for join in contribution.joins {
            if !self.joins.iter().any(|j| j.target == join.target) {
                self.joins.push(join);
            }
        }
        if let Some(predicate) = contribution.predicate {
            self.predicates.push(predicate);
        }
        for column in contribution.group_by {
            if !self.group_by.contains(&column) {
                self.group_by.push(column);
            }
        }
        if let Some(having) = contribution.having {
            self.having.push(having);
        }
        self.order_by.extend(contribution.order_by);
        if self.select.is_none() {
            self.select = contribution.select;
        }
    }

    fn orders(&self) -> Vec<String> {
        if self.order_by.is_empty() {
            vec![DEFAULT_ORDER.to_string()]
        } else {
            self.order_by.clone()
        }
    }

    pub fn build(self, pagination: Pagination) -> BuiltQuery {
        let orders = self.orders();
        let mut params = Vec::new();

        let mut inner = String::from("SELECT dashboard.id FROM dashboard");
        for join in &self.joins {
            inner.push_str(" LEFT OUTER JOIN ");
            inner.push_str(&join.clause);
            params.extend(join.params.iter().cloned());
        }

        if !self.predicates.is_empty() {
            let clauses: Vec<String> = self
                .predicates
                .iter()
                .map(|p| format!("({})", p.sql))
                .collect();
            inner.push_str(" WHERE ");
            inner.push_str(&clauses.join(" AND "));
            for predicate in &self.predicates {
                params.extend(predicate.params.iter().cloned());
            }
        }

        if !self.group_by.is_empty() {
            // Ordered columns must be grouped too
            let mut columns = self.group_by.clone();
            for order in &orders {
                let column = strip_direction(order);
                if !columns.iter().any(|c| c == column) {
                    columns.push(column.to_string());
                }
            }
            inner.push_str(" GROUP BY ");
            inner.push_str(&columns.join(", "));

            if !self.having.is_empty() {
                let clauses: Vec<&str> = self.having.iter().map(|h| h.sql.as_str()).collect();
                inner.push_str(" HAVING ");
                inner.push_str(&clauses.join(" AND "));
                for having in &self.having {
                    params.extend(having.params.iter().cloned());
                }
            }
        }

        inner.push_str(&format!(
            " ORDER BY {}, dashboard.id LIMIT {} OFFSET {}",
            orders.join(", "),
            pagination.limit,
            pagination.offset()
        ));

        let mut sql = String::from(
            "SELECT dashboard.id, dashboard.uid, dashboard.title, dashboard.slug, \
             dashboard_tag.term, dashboard.is_folder, dashboard.folder_id, \
             folder.uid AS folder_uid, folder.slug AS folder_slug, folder.title AS folder_title",
        );
        if let Some(select) = &self.select {
            sql.push_str(", ");
            sql.push_str(select);
        }
        sql.push_str(&format!(
            " FROM ({}) AS ids \
             INNER JOIN dashboard ON ids.id = dashboard.id \
             LEFT OUTER JOIN dashboard AS folder ON folder.id = dashboard.folder_id \
             LEFT OUTER JOIN dashboard_tag ON dashboard.id = dashboard_tag.dashboard_id \
             ORDER BY {}, dashboard.id, dashboard_tag.term",
            inner,
            orders.join(", ")
        ));

        BuiltQuery { sql, params }
    }
}

/// Build the paged search statement for `filters`
pub fn build(filters: &[Filter], limit: i64, page: i64) -> BuiltQuery {
    SearchQueryBuilder::with_filters(filters).build(Pagination::new(limit, page))
}

/// Count folders in `org_id` the permission filter lets through
pub fn build_folder_count(org_id: i64, permission: &PermissionFilter) -> BuiltQuery {
    let mut sql = String::from(
        "SELECT COUNT(dashboard.id) AS count FROM dashboard \
         WHERE dashboard.org_id = ? AND dashboard.is_folder = ?",
    );
    let mut params = vec![int(org_id), boolean(true)];

    if let Some(predicate) = permission.predicate() {
        sql.push_str(&format!(" AND ({})", predicate.sql));
        params.extend(predicate.params);
    }

    BuiltQuery { sql, params }
}

fn strip_direction(order: &str) -> &str {
    order
        .strip_suffix(" ASC")
        .or_else(|| order.strip_suffix(" DESC"))
        .unwrap_or(order)
}
