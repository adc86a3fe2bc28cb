//! Storage session
//!
//! A [`DbSession`] wraps one libsql connection. Rows are decoded while the
//! cursor is positioned on them because a libsql row reads from the live
//! statement.

use crate::db::error::DatabaseError;
use libsql::params::Params;
use libsql::{Connection, Row, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// One connection plus the statement counter of its [`DatabaseService`](crate::db::DatabaseService)
pub struct DbSession {
    conn: Connection,
    statements: Arc<AtomicU64>,
}

impl DbSession {
    pub(crate) fn new(conn: Connection, statements: Arc<AtomicU64>) -> Self {
        Self { conn, statements }
    }

    fn record(&self, sql: &str, params: &[Value]) {
        self.statements.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(sql = %sql, params = ?params, "executing statement");
    }

    /// Execute a statement and return the number of affected rows
    pub async fn execute(&self, sql: &str, params: Vec<Value>) -> Result<u64, DatabaseError> {
        self.record(sql, &params);
        Ok(self.conn.execute(sql, Params::Positional(params)).await?)
    }

    /// Run a query and decode every row with `decode`
    pub async fn query_map<T, F>(
        &self,
        sql: &str,
        params: Vec<Value>,
        mut decode: F,
    ) -> Result<Vec<T>, DatabaseError>
    where
        F: FnMut(&Row) -> Result<T, DatabaseError>,
    {
        self.record(sql, &params);
        let mut rows = self.conn.query(sql, Params::Positional(params)).await?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(decode(&row)?);
        }
        Ok(out)
    }

    /// Run a query and decode the first row, if any
    pub async fn query_one<T, F>(
        &self,
        sql: &str,
        params: Vec<Value>,
        decode: F,
    ) -> Result<Option<T>, DatabaseError>
    where
        F: FnOnce(&Row) -> Result<T, DatabaseError>,
    {
        self.record(sql, &params);
        let mut rows = self.conn.query(sql, Params::Positional(params)).await?;

        match rows.next().await? {
            Some(row) => Ok(Some(decode(&row)?)),
            None => Ok(None),
        }
    }

    /// Start an immediate (write-locking) transaction
    pub async fn begin(&self) -> Result<(), DatabaseError> {
        self.record("BEGIN IMMEDIATE TRANSACTION", &[]);
        self.conn
            .execute("BEGIN IMMEDIATE TRANSACTION", ())
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to begin transaction: {}", e)))?;
        Ok(())
    }

    pub async fn commit(&self) -> Result<(), DatabaseError> {
        self.record("COMMIT", &[]);
        self.conn
            .execute("COMMIT", ())
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to commit transaction: {}", e)))?;
        Ok(())
    }

    pub async fn rollback(&self) -> Result<(), DatabaseError> {
        self.record("ROLLBACK", &[]);
        self.conn
            .execute("ROLLBACK", ())
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to roll back transaction: {}", e))
            })?;
        Ok(())
    }
}

/// Bind an integer parameter
pub fn int(value: i64) -> Value {
    Value::Integer(value)
}

/// Bind a text parameter
pub fn text(value: impl Into<String>) -> Value {
    Value::Text(value.into())
}

/// Bind a boolean as SQLite 0/1
pub fn boolean(value: bool) -> Value {
    Value::Integer(i64::from(value))
}

/// Read a column that may be NULL (e.g. from a LEFT JOIN) as text
pub fn nullable_text(row: &Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get_value(idx)? {
        Value::Null => Ok(None),
        Value::Text(s) => Ok(Some(s)),
        other => Err(DatabaseError::sql_execution(format!(
            "column {} is not text: {:?}",
            idx, other
        ))),
    }
}

/// Read a column that may be NULL as an integer
pub fn nullable_int(row: &Row, idx: i32) -> Result<Option<i64>, DatabaseError> {
    match row.get_value(idx)? {
        Value::Null => Ok(None),
        Value::Integer(i) => Ok(Some(i)),
        other => Err(DatabaseError::sql_execution(format!(
            "column {} is not an integer: {:?}",
            idx, other
        ))),
    }
}
