//! Error types for the bwdb crate.
//!
//! All access-layer operations return [`DbError`] via [`DbResult`].
//! Lookups that find nothing are not errors; they return `Ok(None)`.

use thiserror::Error;

/// Alias for `Result<T, DbError>`.
pub type DbResult<T> = Result<T, DbError>;

/// Errors that can occur in the access layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// The backing file could not be opened or created.
    #[error("storage unavailable at {path}: {message}")]
    StorageUnavailable { path: String, message: String },

    /// An operation needed a connection but the database is closed.
    #[error("database is not open")]
    NotOpen,

    /// The number of arguments does not match the number of placeholders.
    #[error("statement expects {expected} argument(s), {given} given")]
    ArityMismatch { expected: usize, given: usize },

    /// An argument had a runtime type that cannot be bound.
    #[error("unsupported argument type: {0}")]
    UnsupportedArgumentType(String),

    /// SQLite rejected or failed to run a statement.
    #[error("query execution failed: {0}")]
    QueryExecutionFailed(#[from] rusqlite::Error),

    /// An INSERT did not produce a row.
    #[error("insert into {table} failed: {message}")]
    InsertFailed { table: String, message: String },

    /// A schema migration failed.
    #[error("migration v{version} failed: {message}")]
    Migration { version: u32, message: String },

    /// An invalid argument was provided to a table operation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
