//! Permission Check Tests
//!
//! Integration tests for the folder permission checks and the per-dashboard
//! effective permission lookup.

mod common;

#[cfg(test)]
mod permission_tests {
    use super::common;
    use anyhow::Result;
    use panelstore_core::services::search::permissions::ACTION_DASHBOARDS_CREATE;
    use panelstore_core::{DashboardError, OrgRole, PermissionLevel, SignedInUser, StoreConfig};

    #[tokio::test]
    async fn test_editor_role_skips_folder_query() -> Result<()> {
        let store = common::setup().await?;
        store.folder(1, "Ops").await?;
        let service = store.service()?;

        let before = store.db.statements_executed();
        let editor = SignedInUser::new(2, 1, OrgRole::Editor);
        assert!(service.has_edit_permission_in_folders(&editor).await?);
        assert_eq!(store.db.statements_executed(), before);

        let admin = SignedInUser::new(3, 1, OrgRole::Admin);
        assert!(service.has_admin_permission_in_folders(&admin).await?);
        assert_eq!(store.db.statements_executed(), before);

        let mut server_admin = SignedInUser::new(4, 1, OrgRole::Viewer);
        server_admin.is_server_admin = true;
        assert!(service.has_admin_permission_in_folders(&server_admin).await?);
        assert_eq!(store.db.statements_executed(), before);
        Ok(())
    }

    #[tokio::test]
    async fn test_viewer_needs_folder_grant_to_edit() -> Result<()> {
        let store = common::setup().await?;
        let ops = store.folder(1, "Ops").await?;
        store.folder(1, "Dev").await?;
        let service = store.service()?;

        let viewer = SignedInUser::new(5, 1, OrgRole::Viewer);
        let before = store.db.statements_executed();
        assert!(!service.has_edit_permission_in_folders(&viewer).await?);
        assert_eq!(store.db.statements_executed(), before + 1);

        store.user_acl(1, ops, 5, 2).await?;
        assert!(service.has_edit_permission_in_folders(&viewer).await?);

        // a grant in another org does not count
        let other_org_viewer = SignedInUser::new(5, 2, OrgRole::Viewer);
        assert!(!service.has_edit_permission_in_folders(&other_org_viewer).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_editor_needs_admin_grant_for_admin_check() -> Result<()> {
        let store = common::setup().await?;
        let ops = store.folder(1, "Ops").await?;
        let service = store.service()?;

        let editor = SignedInUser::new(2, 1, OrgRole::Editor);
        assert!(!service.has_admin_permission_in_folders(&editor).await?);

        store.user_acl(1, ops, 2, 4).await?;
        assert!(service.has_admin_permission_in_folders(&editor).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_access_control_folder_check_uses_scopes() -> Result<()> {
        let store = common::setup().await?;
        let ops = store.folder(1, "Ops").await?;
        let service = store.service_with(StoreConfig {
            feature_toggles: vec!["accesscontrol".to_string()],
            ..Default::default()
        })?;

        let viewer = SignedInUser::new(5, 1, OrgRole::Viewer);
        assert!(!service.has_edit_permission_in_folders(&viewer).await?);

        let scope = format!("folders:id:{}", ops);
        let creator = viewer.with_permission(ACTION_DASHBOARDS_CREATE, &[scope.as_str()]);
        assert!(service.has_edit_permission_in_folders(&creator).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_dashboard_permissions_for_user() -> Result<()> {
        let store = common::setup().await?;
        let open = store.dashboard(1, "Open", 0).await?;
        let shared = store.dashboard(1, "Shared", 0).await?;
        let closed = store.dashboard(1, "Closed", 0).await?;
        store.set_has_acl(shared).await?;
        store.set_has_acl(closed).await?;
        store.user_acl(1, shared, 5, 2).await?;
        store.org_user(1, 5, "Viewer").await?;

        let service = store.service()?;
        let permissions = service
            .get_dashboard_permissions_for_user(1, 5, OrgRole::Viewer, &[closed, shared, open])
            .await?;

        let summary: Vec<(i64, PermissionLevel, &str)> = permissions
            .iter()
            .map(|p| (p.dashboard_id, p.permission, p.permission_name.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (open, PermissionLevel::View, "View"),
                (shared, PermissionLevel::Edit, "Edit"),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_team_grant_counts_for_dashboard_permissions() -> Result<()> {
        let store = common::setup().await?;
        let folder = store.folder(1, "Team").await?;
        let board = store.dashboard(1, "Board", folder).await?;
        store.set_has_acl(board).await?;
        store.team_acl(1, folder, 9, 4).await?;
        store.team_member(1, 9, 5).await?;
        store.org_user(1, 5, "Viewer").await?;

        let service = store.service()?;
        let permissions = service
            .get_dashboard_permissions_for_user(1, 5, OrgRole::Viewer, &[board])
            .await?;
        assert_eq!(permissions.len(), 1);
        assert_eq!(permissions[0].permission, PermissionLevel::Admin);
        Ok(())
    }

    #[tokio::test]
    async fn test_admin_gets_admin_without_query() -> Result<()> {
        let store = common::setup().await?;
        let service = store.service()?;

        let before = store.db.statements_executed();
        let permissions = service
            .get_dashboard_permissions_for_user(1, 1, OrgRole::Admin, &[3, 1])
            .await?;
        assert_eq!(store.db.statements_executed(), before);

        assert_eq!(permissions.len(), 2);
        assert_eq!(permissions[0].dashboard_id, 3);
        assert!(permissions
            .iter()
            .all(|p| p.permission == PermissionLevel::Admin && p.permission_name == "Admin"));
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_ids_fail_validation_before_storage() -> Result<()> {
        let store = common::setup().await?;
        let service = store.service()?;

        let before = store.db.statements_executed();
        let err = service
            .get_dashboard_permissions_for_user(1, 1, OrgRole::Viewer, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::ValidationFailed(_)));
        assert!(err.is_validation());
        assert_eq!(store.db.statements_executed(), before);
        Ok(())
    }
}
