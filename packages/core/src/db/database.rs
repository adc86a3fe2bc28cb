//! Database Connection Management
//!
//! This module provides the database handle and schema initialization for
//! the dashboard store, using libsql's embedded SQLite engine.
//!
//! # Architecture
//!
//! - **Path-agnostic**: Accepts any valid PathBuf
//! - **Idempotent schema**: `CREATE TABLE IF NOT EXISTS` on every open
//! - **WAL mode**: Write-Ahead Logging so readers do not block the delete cascade
//! - **Sessions**: Each operation opens its own [`DbSession`]; no connection
//!   is shared between calls
//!
//! ```no_run
//! # use panelstore_core::db::DatabaseService;
//! # use std::path::PathBuf;
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db = DatabaseService::new(PathBuf::from("./data/panelstore.db")).await?;
//! let session = db.session().await?;
//! # Ok(())
//! # }
//! ```

use crate::db::error::DatabaseError;
use crate::db::schema;
use crate::db::session::DbSession;
use libsql::{Builder, Database};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Database service for managing the libsql handle and schema
#[derive(Clone)]
pub struct DatabaseService {
    /// libsql database (wrapped in Arc for sharing)
    pub db: Arc<Database>,

    /// Path to the database file
    pub db_path: PathBuf,

    /// Statements issued through sessions opened from this service
    statements: Arc<AtomicU64>,
}

impl std::fmt::Debug for DatabaseService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseService")
            .field("db_path", &self.db_path)
            .field("statements", &self.statements_executed())
            .finish()
    }
}

impl DatabaseService {
    /// Open (or create) the database at `db_path` and initialize the schema
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the parent directory cannot be created,
    /// the connection fails, or a schema statement fails.
    pub async fn new(db_path: PathBuf) -> Result<Self, DatabaseError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = Builder::new_local(&db_path)
            .build()
            .await
            .map_err(|e| DatabaseError::connection_failed(db_path.clone(), e))?;

        let service = Self {
            db: Arc::new(db),
            db_path,
            statements: Arc::new(AtomicU64::new(0)),
        };

        service.initialize_schema().await?;
        tracing::info!("Opened dashboard store at {}", service.db_path.display());

        Ok(service)
    }

    /// Execute a PRAGMA statement
    ///
    /// PRAGMA statements return rows, so they go through query() instead of execute().
    async fn execute_pragma(
        &self,
        conn: &libsql::Connection,
        pragma: &str,
    ) -> Result<(), DatabaseError> {
        let mut stmt = conn.prepare(pragma).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        let _ = stmt.query(()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        Ok(())
    }

    async fn initialize_schema(&self) -> Result<(), DatabaseError> {
        let conn = self.connect()?;

        self.execute_pragma(&conn, "PRAGMA journal_mode = WAL")
            .await?;
        self.execute_pragma(&conn, "PRAGMA busy_timeout = 5000")
            .await?;
        self.execute_pragma(&conn, "PRAGMA foreign_keys = ON")
            .await?;

        for statement in schema::TABLES
            .iter()
            .chain(schema::INDEXES)
            .chain(schema::DEFAULT_ACL)
        {
            conn.execute(statement, ()).await.map_err(|e| {
                DatabaseError::initialization_failed(format!("{}: {}", statement, e))
            })?;
        }

        Ok(())
    }

    /// Get a raw connection
    ///
    /// Prefer [`DatabaseService::session`], which sets the busy timeout and
    /// counts statements.
    pub fn connect(&self) -> Result<libsql::Connection, DatabaseError> {
        self.db.connect().map_err(DatabaseError::LibsqlError)
    }

    /// Open a session with a 5-second busy timeout
    ///
    /// Concurrent writers wait on the lock instead of failing with
    /// `SQLITE_BUSY`; isolation between overlapping cascades is left to
    /// SQLite's locking.
    pub async fn session(&self) -> Result<DbSession, DatabaseError> {
        let conn = self.connect()?;
        self.execute_pragma(&conn, "PRAGMA busy_timeout = 5000")
            .await?;
        Ok(DbSession::new(conn, self.statements.clone()))
    }

    /// Number of statements executed through sessions of this service
    pub fn statements_executed(&self) -> u64 {
        self.statements.load(Ordering::Relaxed)
    }
}
