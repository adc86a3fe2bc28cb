//! Table definitions for the dashboard store.
//!
//! Every statement is `CREATE ... IF NOT EXISTS` so initialization can run
//! on each open. Boolean columns are stored as INTEGER 0/1 and timestamps as
//! unix seconds.

pub(crate) const TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS dashboard (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        version INTEGER NOT NULL DEFAULT 1,
        slug TEXT NOT NULL,
        title TEXT NOT NULL,
        data TEXT NOT NULL DEFAULT '{}',
        org_id INTEGER NOT NULL,
        created INTEGER NOT NULL DEFAULT 0,
        updated INTEGER NOT NULL DEFAULT 0,
        plugin_id TEXT NOT NULL DEFAULT '',
        folder_id INTEGER NOT NULL DEFAULT 0,
        is_folder INTEGER NOT NULL DEFAULT 0,
        has_acl INTEGER NOT NULL DEFAULT 0,
        uid TEXT NOT NULL,
        UNIQUE (org_id, uid)
    )",
    "CREATE TABLE IF NOT EXISTS dashboard_tag (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        dashboard_id INTEGER NOT NULL,
        term TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS star (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        dashboard_id INTEGER NOT NULL,
        UNIQUE (user_id, dashboard_id)
    )",
    "CREATE TABLE IF NOT EXISTS playlist_item (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        playlist_id INTEGER NOT NULL,
        type TEXT NOT NULL,
        value TEXT NOT NULL,
        title TEXT NOT NULL DEFAULT '',
        \"order\" INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS dashboard_version (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        dashboard_id INTEGER NOT NULL,
        version INTEGER NOT NULL,
        data TEXT NOT NULL DEFAULT '{}'
    )",
    "CREATE TABLE IF NOT EXISTS annotation (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        org_id INTEGER NOT NULL,
        dashboard_id INTEGER NOT NULL DEFAULT 0,
        alert_id INTEGER NOT NULL DEFAULT 0,
        text TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS dashboard_provisioning (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        dashboard_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        external_id TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS dashboard_acl (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        org_id INTEGER NOT NULL,
        dashboard_id INTEGER NOT NULL,
        user_id INTEGER,
        team_id INTEGER,
        role TEXT,
        permission INTEGER NOT NULL DEFAULT 1
    )",
    "CREATE TABLE IF NOT EXISTS permission (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        role_id INTEGER NOT NULL,
        action TEXT NOT NULL,
        scope TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS team_member (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        org_id INTEGER NOT NULL,
        team_id INTEGER NOT NULL,
        user_id INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS org_user (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        org_id INTEGER NOT NULL,
        user_id INTEGER NOT NULL,
        role TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS alert (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        org_id INTEGER NOT NULL,
        dashboard_id INTEGER NOT NULL,
        panel_id INTEGER NOT NULL DEFAULT 0,
        name TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS alert_notification_state (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        org_id INTEGER NOT NULL,
        alert_id INTEGER NOT NULL,
        notifier_id INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS alert_rule_tag (
        alert_id INTEGER NOT NULL,
        tag_id INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS alert_rule (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        org_id INTEGER NOT NULL,
        uid TEXT NOT NULL,
        title TEXT NOT NULL,
        namespace_uid TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS alert_rule_version (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        rule_org_id INTEGER NOT NULL,
        rule_uid TEXT NOT NULL,
        rule_namespace_uid TEXT NOT NULL,
        version INTEGER NOT NULL DEFAULT 1
    )",
];

pub(crate) const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_dashboard_org_folder ON dashboard(org_id, folder_id)",
    "CREATE INDEX IF NOT EXISTS idx_dashboard_tag_dashboard ON dashboard_tag(dashboard_id)",
    "CREATE INDEX IF NOT EXISTS idx_dashboard_acl_dashboard ON dashboard_acl(dashboard_id)",
    "CREATE INDEX IF NOT EXISTS idx_permission_scope ON permission(scope)",
    "CREATE INDEX IF NOT EXISTS idx_alert_rule_namespace ON alert_rule(namespace_uid)",
];

/// Role-based default grants that apply to dashboards without their own ACL.
/// `org_id = -1` marks them as global defaults.
pub(crate) const DEFAULT_ACL: &[&str] = &[
    "INSERT OR IGNORE INTO dashboard_acl (id, org_id, dashboard_id, role, permission)
     VALUES (-1, -1, -1, 'Viewer', 1)",
    "INSERT OR IGNORE INTO dashboard_acl (id, org_id, dashboard_id, role, permission)
     VALUES (-2, -1, -1, 'Editor', 2)",
];
