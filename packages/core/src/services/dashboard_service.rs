//! Dashboard Service
//!
//! Entry point for callers: search, folder permission checks, lookups and
//! the cascading delete. Every call opens its own session; the service
//! holds no mutable state beyond the injected metrics sink.

use crate::config::StoreConfig;
use crate::db::DatabaseService;
use crate::models::{
    Dashboard, DashboardPermissionForUser, DashboardRef, DashboardTagCloudItem,
    DeleteDashboardCommand, FindPersistedDashboardsQuery, GetDashboardQuery, Hit, OrgRole,
    PermissionLevel, SignedInUser,
};
use crate::services::delete::{self, AlertRuleStore, SqlAlertRuleStore};
use crate::services::error::DashboardError;
use crate::services::lookups;
use crate::services::permission_checks;
use crate::services::search::{
    PermissionStrategy, SearchExecutor, SearchMetrics, SharedSearchMetrics, ShadowSearchRunner,
};
use std::sync::Arc;

pub struct DashboardService {
    db: Arc<DatabaseService>,
    config: Arc<StoreConfig>,
    executor: SearchExecutor,
    shadow: ShadowSearchRunner,
    alert_rules: Arc<dyn AlertRuleStore>,
}

impl DashboardService {
    /// Service with an in-memory metrics sink and table-backed alert rules
    ///
    /// # Errors
    ///
    /// `ValidationFailed` if the config does not validate.
    pub fn new(db: Arc<DatabaseService>, config: StoreConfig) -> Result<Self, DashboardError> {
        Self::with_collaborators(
            db,
            config,
            Arc::new(SharedSearchMetrics::new()),
            Arc::new(SqlAlertRuleStore),
        )
    }

    pub fn with_collaborators(
        db: Arc<DatabaseService>,
        config: StoreConfig,
        metrics: Arc<dyn SearchMetrics>,
        alert_rules: Arc<dyn AlertRuleStore>,
    ) -> Result<Self, DashboardError> {
        config.validate().map_err(DashboardError::ValidationFailed)?;

        let executor = SearchExecutor::new(db.clone(), config.app_sub_url.clone());
        Ok(Self {
            db,
            config: Arc::new(config),
            executor,
            shadow: ShadowSearchRunner::new(metrics),
            alert_rules,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn database(&self) -> &Arc<DatabaseService> {
        &self.db
    }

    fn strategy(&self) -> PermissionStrategy {
        PermissionStrategy::from_config(&self.config)
    }

    /// Dashboards and folders matching `query` that the user may see
    pub async fn search_dashboards(
        &self,
        query: &FindPersistedDashboardsQuery,
    ) -> Result<Vec<Hit>, DashboardError> {
        let strategy = self.strategy();

        let hits = if self.config.shadow_search {
            let executor = &self.executor;
            self.shadow
                .run(strategy, move |s| executor.find(query, s))
                .await?
        } else {
            self.executor.find(query, strategy).await?
        };

        tracing::debug!(
            user_id = query.signed_in_user.user_id,
            strategy = ?strategy,
            hits = hits.len(),
            "dashboard search"
        );
        Ok(hits)
    }

    pub async fn has_edit_permission_in_folders(&self, user: &SignedInUser) -> Result<bool, DashboardError> {
        self.has_permission_in_folders(user, PermissionLevel::Edit).await
    }

    pub async fn has_admin_permission_in_folders(&self, user: &SignedInUser) -> Result<bool, DashboardError> {
        self.has_permission_in_folders(user, PermissionLevel::Admin).await
    }

    async fn has_permission_in_folders(
        &self,
        user: &SignedInUser,
        level: PermissionLevel,
    ) -> Result<bool, DashboardError> {
        let session = self.db.session().await?;
        permission_checks::has_permission_in_folders(&session, self.strategy(), user, level).await
    }

    /// Delete a dashboard or a folder with its contents
    ///
    /// # Errors
    ///
    /// - `NotFound` if the dashboard does not exist in the org
    /// - `FolderContainsAlertRules` if the folder owns alert rules and the
    ///   command is not forced; nothing is deleted
    /// - `Database` on storage failure; nothing is deleted
    pub async fn delete_dashboard(&self, cmd: &DeleteDashboardCommand) -> Result<(), DashboardError> {
        let session = self.db.session().await?;
        delete::delete_dashboard(&session, cmd, self.alert_rules.as_ref()).await
    }

    pub async fn get_dashboard(&self, query: &GetDashboardQuery) -> Result<Dashboard, DashboardError> {
        let session = self.db.session().await?;
        lookups::get_dashboard(&session, query).await
    }

    pub async fn get_dashboard_uid_by_id(&self, id: i64) -> Result<DashboardRef, DashboardError> {
        let session = self.db.session().await?;
        lookups::get_dashboard_uid_by_id(&session, id).await
    }

    pub async fn get_dashboard_slug_by_id(&self, id: i64) -> Result<String, DashboardError> {
        let session = self.db.session().await?;
        lookups::get_dashboard_slug_by_id(&session, id).await
    }

    pub async fn get_dashboards(&self, ids: &[i64]) -> Result<Vec<Dashboard>, DashboardError> {
        let session = self.db.session().await?;
        lookups::get_dashboards(&session, ids).await
    }

    pub async fn get_dashboards_by_plugin_id(
        &self,
        org_id: i64,
        plugin_id: &str,
    ) -> Result<Vec<Dashboard>, DashboardError> {
        let session = self.db.session().await?;
        lookups::get_dashboards_by_plugin_id(&session, org_id, plugin_id).await
    }

    pub async fn get_dashboard_tags(&self, org_id: i64) -> Result<Vec<DashboardTagCloudItem>, DashboardError> {
        let session = self.db.session().await?;
        lookups::get_dashboard_tags(&session, org_id).await
    }

    pub async fn get_dashboard_permissions_for_user(
        &self,
        org_id: i64,
        user_id: i64,
        org_role: OrgRole,
        dashboard_ids: &[i64],
    ) -> Result<Vec<DashboardPermissionForUser>, DashboardError> {
        let session = self.db.session().await?;
        permission_checks::get_dashboard_permissions_for_user(
            &session,
            org_id,
            user_id,
            org_role,
            dashboard_ids,
        )
        .await
    }
}
