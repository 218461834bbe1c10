//! Database error types.

use thiserror::Error;

use crate::schema::StudentId;

/// Result alias used throughout the storage layer.
pub type DbResult<T> = Result<T, DbError>;

/// Persistence gateway errors.
#[derive(Error, Debug)]
pub enum DbError {
    /// No record has the requested id
    #[error("Student with id {id} not found")]
    NotFound { id: StudentId },

    /// Record violates a column constraint before reaching SQLite
    #[error("Invalid student: {0}")]
    Validation(String),

    /// Underlying SQLite failure (constraint violation, I/O, locking)
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection could not be checked out of the pool
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Database was migrated by a newer binary
    #[error("Database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },

    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Blocking storage task panicked or was cancelled
    #[error("Storage task failed: {0}")]
    TaskFailed(String),
}

impl DbError {
    /// Returns true for errors caused by the caller's input rather than storage.
    pub fn is_client_error(&self) -> bool {
        matches!(self, DbError::NotFound { .. } | DbError::Validation(_))
    }
}
