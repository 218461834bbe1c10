//! Database configuration.

use std::path::PathBuf;

use crate::error::{DbError, DbResult};

/// Environment variable holding the database connection string.
pub const DATABASE_URI_ENV: &str = "DATABASE_URI";

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Connection string (`sqlite://path`, `sqlite::memory:`, `:memory:` or a file path)
    pub database_uri: String,
    /// Maximum pooled connections (forced to 1 for in-memory databases)
    pub pool_max_size: u32,
    /// SQLite busy timeout in milliseconds
    pub busy_timeout_ms: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            database_uri: ":memory:".to_string(),
            pool_max_size: 8,
            busy_timeout_ms: 5000,
        }
    }
}

/// Where the connection string points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    Memory,
    File(PathBuf),
}

impl DbConfig {
    /// Creates a configuration for the given connection string with default pool settings.
    pub fn new(database_uri: impl Into<String>) -> Self {
        Self {
            database_uri: database_uri.into(),
            ..Default::default()
        }
    }

    /// Resolves the connection string into a storage target.
    pub fn target(&self) -> DbResult<DatabaseTarget> {
        let uri = self.database_uri.trim();
        if uri.is_empty() {
            return Err(DbError::Config(format!(
                "{} environment variable is not set",
                DATABASE_URI_ENV
            )));
        }

        let rest = uri
            .strip_prefix("sqlite://")
            .or_else(|| uri.strip_prefix("sqlite:"))
            .unwrap_or(uri);

        match rest {
            ":memory:" => Ok(DatabaseTarget::Memory),
            "" => Err(DbError::Config(format!(
                "connection string '{}' has no database path",
                uri
            ))),
            path => Ok(DatabaseTarget::File(PathBuf::from(path))),
        }
    }

    /// Pool size actually used for the target.
    ///
    /// Each in-memory SQLite connection owns a private database, so the pool
    /// must hold exactly one connection for every request to see the same data.
    pub fn effective_pool_size(&self) -> DbResult<u32> {
        match self.target()? {
            DatabaseTarget::Memory => Ok(1),
            DatabaseTarget::File(_) if self.pool_max_size == 0 => Err(DbError::Config(
                "pool size must be at least 1".to_string(),
            )),
            DatabaseTarget::File(_) => Ok(self.pool_max_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_forms() {
        assert_eq!(
            DbConfig::new("sqlite::memory:").target().unwrap(),
            DatabaseTarget::Memory
        );
        assert_eq!(
            DbConfig::new(":memory:").target().unwrap(),
            DatabaseTarget::Memory
        );
        assert_eq!(
            DbConfig::new("sqlite://data/students.db").target().unwrap(),
            DatabaseTarget::File(PathBuf::from("data/students.db"))
        );
        assert_eq!(
            DbConfig::new("sqlite:///tmp/students.db").target().unwrap(),
            DatabaseTarget::File(PathBuf::from("/tmp/students.db"))
        );
        assert_eq!(
            DbConfig::new("students.db").target().unwrap(),
            DatabaseTarget::File(PathBuf::from("students.db"))
        );
    }

    #[test]
    fn test_empty_uri_is_rejected() {
        let err = DbConfig::new("  ").target().unwrap_err();
        assert!(matches!(err, DbError::Config(_)));
        assert!(err.to_string().contains(DATABASE_URI_ENV));

        assert!(DbConfig::new("sqlite://").target().is_err());
    }

    #[test]
    fn test_effective_pool_size() {
        let memory = DbConfig {
            pool_max_size: 16,
            ..DbConfig::new(":memory:")
        };
        assert_eq!(memory.effective_pool_size().unwrap(), 1);

        let file = DbConfig {
            pool_max_size: 4,
            ..DbConfig::new("students.db")
        };
        assert_eq!(file.effective_pool_size().unwrap(), 4);

        let zero = DbConfig {
            pool_max_size: 0,
            ..DbConfig::new("students.db")
        };
        assert!(zero.effective_pool_size().is_err());
    }
}
