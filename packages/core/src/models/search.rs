//! Search request and result types.

use crate::models::{PermissionLevel, SignedInUser};
use serde::{Deserialize, Serialize};

/// Kind of a search hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitType {
    #[serde(rename = "dash-db")]
    Dashboard,
    #[serde(rename = "dash-folder")]
    Folder,
}

impl HitType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "dash-db" => Some(HitType::Dashboard),
            "dash-folder" => Some(HitType::Folder),
            _ => None,
        }
    }
}

/// One dashboard or folder in a search response
///
/// Built once per distinct dashboard id; tags accumulate over the rows
/// the tag join produced for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hit {
    pub id: i64,
    pub uid: String,
    pub title: String,
    pub uri: String,
    pub url: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub hit_type: HitType,
    pub tags: Vec<String>,
    pub is_starred: bool,
    #[serde(skip_serializing_if = "is_zero")]
    pub folder_id: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub folder_uid: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub folder_title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub folder_url: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub sort_meta: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sort_meta_name: String,
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

/// How search results are ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOption {
    #[default]
    #[serde(rename = "alpha-asc")]
    AlphaAsc,
    #[serde(rename = "alpha-desc")]
    AlphaDesc,
    #[serde(rename = "created-asc")]
    CreatedAsc,
    #[serde(rename = "created-desc")]
    CreatedDesc,
}

impl SortOption {
    pub fn name(&self) -> &'static str {
        match self {
            SortOption::AlphaAsc => "alpha-asc",
            SortOption::AlphaDesc => "alpha-desc",
            SortOption::CreatedAsc => "created-asc",
            SortOption::CreatedDesc => "created-desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        [
            SortOption::AlphaAsc,
            SortOption::AlphaDesc,
            SortOption::CreatedAsc,
            SortOption::CreatedDesc,
        ]
        .into_iter()
        .find(|s| s.name() == value)
    }

    /// Name reported on hits when the sort exposes a per-hit value
    pub fn meta_name(&self) -> Option<&'static str> {
        match self {
            SortOption::AlphaAsc | SortOption::AlphaDesc => None,
            SortOption::CreatedAsc | SortOption::CreatedDesc => Some("created"),
        }
    }
}

/// Parameters of a dashboard search
#[derive(Debug, Clone)]
pub struct FindPersistedDashboardsQuery {
    pub signed_in_user: SignedInUser,
    /// Explicit org; 0 falls back to the user's org
    pub org_id: i64,
    pub title: String,
    pub tags: Vec<String>,
    pub hit_type: Option<HitType>,
    pub dashboard_ids: Vec<i64>,
    pub folder_ids: Vec<i64>,
    pub is_starred: bool,
    pub permission: PermissionLevel,
    pub sort: SortOption,
    pub limit: i64,
    pub page: i64,
}

impl FindPersistedDashboardsQuery {
    /// A view-level search with no filters beyond the user's org
    pub fn new(signed_in_user: SignedInUser) -> Self {
        Self {
            signed_in_user,
            org_id: 0,
            title: String::new(),
            tags: Vec::new(),
            hit_type: None,
            dashboard_ids: Vec::new(),
            folder_ids: Vec::new(),
            is_starred: false,
            permission: PermissionLevel::View,
            sort: SortOption::default(),
            limit: 0,
            page: 0,
        }
    }
}
