//! Search filters
//!
//! Each [`Filter`] contributes pieces of the id subquery: joins, one
//! predicate, grouping, ordering and an extra selected column. The set of
//! variants is closed; the builder merges contributions in filter order.

use crate::db::{int, text};
use crate::models::{HitType, SortOption};
use crate::services::search::permissions::PermissionFilter;
use libsql::Value;

/// A LEFT OUTER JOIN required by a filter
///
/// Joins are deduplicated on `target`, the alias the join introduces. When
/// two filters ask for the same target the first one wins, parameters
/// included.
#[derive(Debug, Clone)]
pub struct Join {
    pub target: String,
    /// Everything after `LEFT OUTER JOIN`
    pub clause: String,
    pub params: Vec<Value>,
}

/// A SQL fragment with its positional parameters
#[derive(Debug, Clone)]
pub struct Fragment {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Fragment {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// What one filter adds to the statement
#[derive(Debug, Clone, Default)]
pub struct Contribution {
    pub joins: Vec<Join>,
    pub predicate: Option<Fragment>,
    pub group_by: Vec<String>,
    /// Only emitted together with a GROUP BY
    pub having: Option<Fragment>,
    /// Order expressions over `dashboard` columns, with direction
    pub order_by: Vec<String>,
    /// Extra column for the outer select, aliased `sort_meta`
    pub select: Option<String>,
}

#[derive(Debug, Clone)]
pub enum Filter {
    Permission(PermissionFilter),
    Sort(SortOption),
    Org(i64),
    /// Dashboard must carry every listed tag
    Tags(Vec<String>),
    Dashboards(Vec<i64>),
    Starred { user_id: i64 },
    /// Case-insensitive substring match on the title
    Title(String),
    Type(HitType),
    Folders(Vec<i64>),
}

impl Filter {
    pub fn contribute(&self) -> Contribution {
        match self {
            Filter::Permission(permission) => Contribution {
                predicate: permission.predicate(),
                ..Default::default()
            },
            Filter::Sort(sort) => sort_contribution(*sort),
            Filter::Org(org_id) => Contribution {
                predicate: Some(Fragment::new("dashboard.org_id = ?", vec![int(*org_id)])),
                ..Default::default()
            },
            Filter::Tags(tags) => tags_contribution(tags),
            Filter::Dashboards(ids) => Contribution {
                predicate: Some(id_list("dashboard.id", ids)),
                ..Default::default()
            },
            Filter::Starred { user_id } => Contribution {
                joins: vec![Join {
                    target: "star".to_string(),
                    clause: "star ON star.dashboard_id = dashboard.id AND star.user_id = ?"
                        .to_string(),
                    params: vec![int(*user_id)],
                }],
                predicate: Some(Fragment::new("star.id IS NOT NULL", Vec::new())),
                ..Default::default()
            },
            Filter::Title(title) => Contribution {
                predicate: Some(Fragment::new(
                    "dashboard.title LIKE ?",
                    vec![text(format!("%{}%", title))],
                )),
                ..Default::default()
            },
            Filter::Type(hit_type) => {
                let sql = match hit_type {
                    HitType::Folder => "dashboard.is_folder = 1",
                    HitType::Dashboard => "dashboard.is_folder = 0",
                };
                Contribution {
                    predicate: Some(Fragment::new(sql, Vec::new())),
                    ..Default::default()
                }
            }
            Filter::Folders(ids) => Contribution {
                predicate: Some(id_list("dashboard.folder_id", ids)),
                ..Default::default()
            },
        }
    }
}

fn sort_contribution(sort: SortOption) -> Contribution {
    let (order, select) = match sort {
        SortOption::AlphaAsc => ("dashboard.title ASC", None),
        SortOption::AlphaDesc => ("dashboard.title DESC", None),
        SortOption::CreatedAsc => ("dashboard.created ASC", Some("dashboard.created")),
        SortOption::CreatedDesc => ("dashboard.created DESC", Some("dashboard.created")),
    };
    Contribution {
        order_by: vec![order.to_string()],
        select: select.map(|col| format!("{} AS sort_meta", col)),
        ..Default::default()
    }
}

fn tags_contribution(tags: &[String]) -> Contribution {
    let mut distinct: Vec<&String> = Vec::new();
    for tag in tags {
        if !distinct.contains(&tag) {
            distinct.push(tag);
        }
    }

    if distinct.is_empty() {
        return Contribution::default();
    }

    Contribution {
        joins: vec![Join {
            target: "dashboard_tag_filter".to_string(),
            clause: "dashboard_tag AS dashboard_tag_filter ON dashboard_tag_filter.dashboard_id = dashboard.id"
                .to_string(),
            params: Vec::new(),
        }],
        predicate: Some(Fragment::new(
            format!("dashboard_tag_filter.term IN ({})", placeholders(distinct.len())),
            distinct.iter().map(|t| text(t.as_str())).collect(),
        )),
        group_by: vec!["dashboard.id".to_string()],
        having: Some(Fragment::new(
            "COUNT(DISTINCT dashboard_tag_filter.term) = ?",
            vec![int(distinct.len() as i64)],
        )),
        ..Default::default()
    }
}

fn id_list(column: &str, ids: &[i64]) -> Fragment {
    if ids.is_empty() {
        return Fragment::new("1 = 0", Vec::new());
    }
    Fragment::new(
        format!("{} IN ({})", column, placeholders(ids.len())),
        ids.iter().map(|id| int(*id)).collect(),
    )
}

/// `?, ?, ?` for `n` parameters
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
