//! Development Search Binary
//!
//! Runs one dashboard search against a local database and prints the hits
//! as JSON.
//!
//! # Usage
//!
//! ```bash
//! PANELSTORE_DB_PATH=./panelstore.db cargo run --bin dev-search -- <org_id> <user_id> [title]
//! ```
//!
//! # Environment Variables
//!
//! - `PANELSTORE_DB_PATH`: Database file (default: `panelstore-dev.db`)
//! - `PANELSTORE_ORG_ROLE`: Role of the searching user, `Viewer`, `Editor` or `Admin` (default: `Viewer`)
//! - `PANELSTORE_SEARCH_TYPE`: Restrict hits to `dash-db` or `dash-folder`
//! - `PANELSTORE_SEARCH_SORT`: `alpha-asc`, `alpha-desc`, `created-asc` or `created-desc`
//! - `PANELSTORE_FEATURE_TOGGLES`, `PANELSTORE_APP_SUB_URL`, `PANELSTORE_SHADOW_SEARCH`: see `StoreConfig::from_env`
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "trace")

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use panelstore_core::db::DatabaseService;
use panelstore_core::{
    DashboardService, FindPersistedDashboardsQuery, HitType, OrgRole, SignedInUser, SortOption, StoreConfig,
};

fn parse_role(raw: &str) -> anyhow::Result<OrgRole> {
    match raw {
        "Viewer" => Ok(OrgRole::Viewer),
        "Editor" => Ok(OrgRole::Editor),
        "Admin" => Ok(OrgRole::Admin),
        other => anyhow::bail!("unknown org role '{}'", other),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 2 {
        anyhow::bail!("usage: dev-search <org_id> <user_id> [title]");
    }
    let org_id: i64 = args[0].parse().context("org_id must be an integer")?;
    let user_id: i64 = args[1].parse().context("user_id must be an integer")?;
    let title = args.get(2).cloned().unwrap_or_default();

    let hit_type = match env::var("PANELSTORE_SEARCH_TYPE") {
        Ok(raw) => Some(HitType::parse(&raw).with_context(|| format!("unknown hit type '{}'", raw))?),
        Err(_) => None,
    };
    let sort = match env::var("PANELSTORE_SEARCH_SORT") {
        Ok(raw) => SortOption::parse(&raw).with_context(|| format!("unknown sort '{}'", raw))?,
        Err(_) => SortOption::default(),
    };

    let role = parse_role(&env::var("PANELSTORE_ORG_ROLE").unwrap_or_else(|_| "Viewer".to_string()))?;

    let db_path = env::var("PANELSTORE_DB_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("panelstore-dev.db"));
    tracing::info!("Database: {}", db_path.display());

    let db = Arc::new(DatabaseService::new(db_path).await?);
    let config = StoreConfig::from_env();
    let service = DashboardService::new(db, config)?;

    let mut query = FindPersistedDashboardsQuery::new(SignedInUser::new(user_id, org_id, role));
    query.title = title;
    query.hit_type = hit_type;
    query.sort = sort;

    let hits = service.search_dashboards(&query).await?;
    tracing::info!("{} hits", hits.len());
    println!("{}", serde_json::to_string_pretty(&hits)?);

    Ok(())
}
