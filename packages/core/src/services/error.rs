//! Service Layer Error Types
//!
//! This module defines the domain errors of the dashboard store. Storage
//! failures are wrapped without modification so callers can tell a missing
//! dashboard from a locked database.

use crate::db::DatabaseError;
use thiserror::Error;

/// Dashboard service errors
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Dashboard or folder does not exist in the org
    #[error("Dashboard not found")]
    NotFound,

    /// Lookup without id, slug or uid
    #[error("Validation failed: dashboard identifier not set")]
    IdentifierNotSet,

    /// Command or query failed validation before touching storage
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// Folder still owns alert rules and the caller did not force the delete
    #[error("folder cannot be deleted: folder contains alert rules")]
    FolderContainsAlertRules,

    /// Database operation failed
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),
}

impl DashboardError {
    /// Create a validation failed error
    pub fn validation_failed(msg: impl Into<String>) -> Self {
        Self::ValidationFailed(msg.into())
    }

    /// Both validation variants
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DashboardError::IdentifierNotSet | DashboardError::ValidationFailed(_)
        )
    }
}

impl From<libsql::Error> for DashboardError {
    fn from(err: libsql::Error) -> Self {
        DashboardError::Database(DatabaseError::LibsqlError(err))
    }
}
