//! Store configuration
//!
//! StoreConfig is read once when the service is built and shared immutably.
//! Feature toggles are looked up per call, so a service built with a new
//! config switches permission strategy on the next search.

use serde::{Deserialize, Serialize};

/// Toggle that selects scope-based access control over the legacy ACL filter
pub const ACCESS_CONTROL_TOGGLE: &str = "accesscontrol";

/// Configuration for the dashboard store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Prefix prepended to every hit URL (e.g. "/grafana"), empty for root
    pub app_sub_url: String,

    /// Enabled feature toggles
    pub feature_toggles: Vec<String>,

    /// Run the inactive permission strategy next to the active one and
    /// record whether both return the same hits
    pub shadow_search: bool,
}

impl StoreConfig {
    /// Build a config from `PANELSTORE_*` environment variables
    ///
    /// - `PANELSTORE_APP_SUB_URL`: hit URL prefix
    /// - `PANELSTORE_FEATURE_TOGGLES`: comma-separated toggle names
    /// - `PANELSTORE_SHADOW_SEARCH`: `true`/`1` to enable shadow search
    pub fn from_env() -> Self {
        let app_sub_url = std::env::var("PANELSTORE_APP_SUB_URL").unwrap_or_default();

        let feature_toggles = std::env::var("PANELSTORE_FEATURE_TOGGLES")
            .map(|raw| parse_toggles(&raw))
            .unwrap_or_default();

        let shadow_search = std::env::var("PANELSTORE_SHADOW_SEARCH")
            .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "yes"))
            .unwrap_or(false);

        Self {
            app_sub_url,
            feature_toggles,
            shadow_search,
        }
    }

    pub fn is_feature_toggle_enabled(&self, name: &str) -> bool {
        self.feature_toggles.iter().any(|t| t == name)
    }

    /// Whether searches filter by access-control scopes instead of ACL rows
    pub fn access_control_enabled(&self) -> bool {
        self.is_feature_toggle_enabled(ACCESS_CONTROL_TOGGLE)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.app_sub_url.is_empty() && !self.app_sub_url.starts_with('/') {
            return Err(format!(
                "app_sub_url must start with '/', got '{}'",
                self.app_sub_url
            ));
        }

        if self.app_sub_url.ends_with('/') {
            return Err("app_sub_url must not end with '/'".to_string());
        }

        if self.feature_toggles.iter().any(|t| t.trim().is_empty()) {
            return Err("feature toggle names cannot be empty".to_string());
        }

        Ok(())
    }
}

fn parse_toggles(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
