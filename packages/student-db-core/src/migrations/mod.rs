//! Embedded SQLite migrations.
//!
//! Migrations are applied in increasing version order inside a single
//! transaction. The applied version is mirrored to `PRAGMA user_version`.

use rusqlite::{Connection, OpenFlags};

use crate::config::{DatabaseTarget, DbConfig};
use crate::error::{DbError, DbResult};

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "create_students",
    sql: include_str!("0001_create_students.sql"),
}];

/// Latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Schema version currently recorded in the database.
pub fn current_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Applied and latest schema versions of a database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaStatus {
    pub current: u32,
    pub latest: u32,
}

impl SchemaStatus {
    pub fn pending(&self) -> u32 {
        self.latest.saturating_sub(self.current)
    }
}

/// Reads the schema version of the configured database without migrating it.
///
/// A database file that does not exist yet reports version 0 and is not created.
pub fn inspect(config: &DbConfig) -> DbResult<SchemaStatus> {
    let current = match config.target()? {
        DatabaseTarget::Memory => 0,
        DatabaseTarget::File(path) if !path.exists() => 0,
        DatabaseTarget::File(path) => {
            let conn = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
            current_version(&conn)?
        }
    };
    Ok(SchemaStatus {
        current,
        latest: latest_version(),
    })
}

/// Applies all pending migrations and returns the number applied.
///
/// Running against an up-to-date database is a no-op.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let current = current_version(conn)?;
    let latest = latest_version();

    if current > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: latest,
        });
    }

    if current == latest {
        tracing::debug!(version = current, "Schema is up to date");
        return Ok(0);
    }

    let tx = conn.transaction()?;
    let mut applied = 0;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        tracing::info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
        applied += 1;
    }
    tx.commit()?;

    Ok(applied)
}
