//! Persistence gateway for student records.
//!
//! Every operation checks a connection out of the pool for its duration and
//! either commits its change as a unit or leaves the table untouched.

use std::time::{Duration, Instant};

use chrono::Utc;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension, TransactionBehavior};

use crate::config::{DatabaseTarget, DbConfig};
use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::schema::{NewStudent, Student, StudentId, STUDENT_SELECT_SQL};

type SqlitePool = Pool<SqliteConnectionManager>;
type SqliteConn = PooledConnection<SqliteConnectionManager>;

/// Snapshot of connection pool usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    pub connections: u32,
    pub idle_connections: u32,
    pub max_size: u32,
}

/// Pooled SQLite gateway. Cloning shares the underlying pool.
#[derive(Clone)]
pub struct StudentGateway {
    pool: SqlitePool,
    target: DatabaseTarget,
}

impl std::fmt::Debug for StudentGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudentGateway")
            .field("target", &self.target)
            .field("pool", &self.pool_status())
            .finish()
    }
}

impl StudentGateway {
    /// Builds the connection pool and applies pending migrations.
    ///
    /// # Errors
    /// Returns `DbError::Config` for an unusable connection string,
    /// `DbError::Pool` if no connection can be opened, and migration errors
    /// if the schema cannot be brought up to date.
    pub fn open(config: &DbConfig) -> DbResult<Self> {
        let started_at = Instant::now();
        let target = config.target()?;
        let max_size = config.effective_pool_size()?;
        let busy_timeout = Duration::from_millis(config.busy_timeout_ms);

        tracing::info!(target_db = ?target, max_size, "Opening student database");

        let is_file = matches!(target, DatabaseTarget::File(_));
        let manager = match &target {
            DatabaseTarget::Memory => SqliteConnectionManager::memory(),
            DatabaseTarget::File(path) => SqliteConnectionManager::file(path),
        }
        .with_init(move |conn| {
            conn.busy_timeout(busy_timeout)?;
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            if is_file {
                conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                    row.get::<_, String>(0)
                })?;
            }
            Ok(())
        });

        let mut builder = Pool::builder().max_size(max_size);
        if !is_file {
            // The database lives only as long as its single connection.
            builder = builder
                .min_idle(Some(1))
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = builder.build(manager)?;

        let gateway = Self { pool, target };
        let applied = {
            let mut conn = gateway.conn()?;
            migrations::apply_migrations(&mut conn)?
        };

        tracing::info!(
            applied_migrations = applied,
            schema_version = migrations::latest_version(),
            duration_ms = started_at.elapsed().as_millis() as u64,
            "Student database ready"
        );
        Ok(gateway)
    }

    /// Opens a private in-memory database. Useful for tests and demos.
    pub fn open_in_memory() -> DbResult<Self> {
        Self::open(&DbConfig::new(":memory:"))
    }

    fn conn(&self) -> DbResult<SqliteConn> {
        Ok(self.pool.get()?)
    }

    /// Storage target the gateway was opened against.
    pub fn target(&self) -> &DatabaseTarget {
        &self.target
    }

    pub fn pool_status(&self) -> PoolStatus {
        let state = self.pool.state();
        PoolStatus {
            connections: state.connections,
            idle_connections: state.idle_connections,
            max_size: self.pool.max_size(),
        }
    }

    /// Stores a new record and returns its assigned id.
    ///
    /// The insert runs in an immediate transaction so that `created_at`
    /// order follows id order across concurrent writers.
    pub fn insert(&self, student: &NewStudent) -> DbResult<StudentId> {
        student.validate()?;

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO students (name, age, grade, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![student.name, student.age, student.grade, Utc::now()],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        tracing::debug!(id, "Inserted student");
        Ok(id)
    }

    /// Returns every record in ascending id order.
    pub fn fetch_all(&self) -> DbResult<Vec<Student>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY id", STUDENT_SELECT_SQL))?;
        let students = stmt
            .query_map([], Student::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(students)
    }

    /// Point lookup by id.
    pub fn fetch_by_id(&self, id: StudentId) -> DbResult<Student> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("{} WHERE id = ?1", STUDENT_SELECT_SQL),
            params![id],
            Student::from_row,
        )
        .optional()?
        .ok_or(DbError::NotFound { id })
    }

    /// Overwrites name, age and grade of an existing record.
    pub fn update(&self, id: StudentId, student: &NewStudent) -> DbResult<Student> {
        student.validate()?;

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE students SET name = ?1, age = ?2, grade = ?3 WHERE id = ?4",
            params![student.name, student.age, student.grade, id],
        )?;
        if changed == 0 {
            return Err(DbError::NotFound { id });
        }
        let updated = tx.query_row(
            &format!("{} WHERE id = ?1", STUDENT_SELECT_SQL),
            params![id],
            Student::from_row,
        )?;
        tx.commit()?;

        tracing::debug!(id, "Updated student");
        Ok(updated)
    }

    /// Removes a record.
    pub fn delete(&self, id: StudentId) -> DbResult<()> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM students WHERE id = ?1", params![id])?;
        if removed == 0 {
            return Err(DbError::NotFound { id });
        }

        tracing::debug!(id, "Deleted student");
        Ok(())
    }

    /// Number of stored records.
    pub fn count(&self) -> DbResult<u64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM students", [], |row| {
            row.get::<_, i64>(0)
        })?;
        Ok(count as u64)
    }

    /// Checks that a connection can be acquired and queried.
    pub fn ping(&self) -> DbResult<()> {
        let conn = self.conn()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    /// Schema version recorded in the database.
    pub fn schema_version(&self) -> DbResult<u32> {
        let conn = self.conn()?;
        migrations::current_version(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_pool_holds_one_connection() {
        let gateway = StudentGateway::open_in_memory().unwrap();
        let status = gateway.pool_status();
        assert_eq!(status.max_size, 1);
        assert_eq!(status.connections, 1);
        assert_eq!(gateway.target(), &DatabaseTarget::Memory);
    }

    #[test]
    fn test_in_memory_data_survives_across_checkouts() {
        let gateway = StudentGateway::open_in_memory().unwrap();
        let id = gateway.insert(&NewStudent::new("Ada", 30, "A")).unwrap();
        let clone = gateway.clone();
        assert_eq!(clone.fetch_by_id(id).unwrap().name, "Ada");
        assert_eq!(clone.count().unwrap(), 1);
    }

    #[test]
    fn test_validation_happens_before_storage() {
        let gateway = StudentGateway::open_in_memory().unwrap();
        let err = gateway.insert(&NewStudent::new("", 30, "A")).unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
        assert_eq!(gateway.count().unwrap(), 0);
    }

    #[test]
    fn test_ping_and_schema_version() {
        let gateway = StudentGateway::open_in_memory().unwrap();
        gateway.ping().unwrap();
        assert_eq!(
            gateway.schema_version().unwrap(),
            migrations::latest_version()
        );
    }
}
