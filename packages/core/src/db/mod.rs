//! Database Layer
//!
//! This module handles all storage interactions using libsql:
//!
//! - Database initialization and connection management
//! - Schema for dashboards and every record that depends on them
//! - Sessions with parameterized execution, row decoding and
//!   explicit BEGIN/COMMIT/ROLLBACK
//!
//! Query composition and the delete cascade live in the service layer;
//! this module only knows how to run SQL.

mod database;
mod error;
mod schema;
mod session;

pub use database::DatabaseService;
pub use error::DatabaseError;
pub use session::{boolean, int, nullable_int, nullable_text, text, DbSession};
