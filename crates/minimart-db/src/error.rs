//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← categorized: duplicate code, duplicate         │
//! │       │                  receipt, FK violation, corruption, ...         │
//! │       ▼                                                                 │
//! │  EngineError (minimart-engine) ← what callers of the engines see        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Database operation errors.
///
/// These wrap sqlx errors and give the engines something they can
/// match on. Constraint failures become typed variants so the caller
/// can distinguish "retry with different input" (duplicates) from
/// "fatal to the operation" (everything else).
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in the database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Product code already exists (live or soft-deleted row).
    ///
    /// Deleted rows keep their code reserved: the UNIQUE constraint
    /// spans all rows regardless of the deleted flag.
    #[error("duplicate product code: '{code}' already exists")]
    DuplicateCode { code: String },

    /// Receipt number already exists.
    ///
    /// Receipt numbers have second resolution, so two checkouts
    /// completing within the same second collide here. The engine does
    /// not retry; the caller may.
    #[error("duplicate receipt number: '{receipt_number}' already exists")]
    DuplicateReceipt { receipt_number: String },

    /// Some other UNIQUE index violation.
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// Foreign key constraint violation (e.g. ledger row referencing a
    /// product id that does not exist).
    #[error("foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A persisted value no longer parses into its closed domain type
    /// (e.g. an unrecognized category name). Surfaced instead of a
    /// panic so a damaged row cannot take the process down.
    #[error("data corruption in {table}.{column}: unrecognized value '{value}'")]
    DataCorruption {
        table: String,
        column: String,
        value: String,
    },

    /// Database connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a DataCorruption error for an unparseable column value.
    pub fn corruption(
        table: impl Into<String>,
        column: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        DbError::DataCorruption {
            table: table.into(),
            column: column.into(),
            value: value.into(),
        }
    }

    /// True when this error is a UNIQUE violation on the named
    /// `table.column` constraint. Repositories use this to promote the
    /// raw violation into `DuplicateCode` / `DuplicateReceipt` with the
    /// offending value attached.
    pub fn is_unique_violation_on(&self, constraint: &str) -> bool {
        matches!(self, DbError::UniqueViolation { constraint: c } if c.contains(constraint))
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                //   "UNIQUE constraint failed: <table>.<column>"
                //   "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let constraint = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation { constraint }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
