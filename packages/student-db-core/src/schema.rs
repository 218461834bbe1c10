//! Student record schema.
//!
//! `Student` mirrors one row of the `students` table. `NewStudent` carries the
//! caller-supplied columns for inserts and full overwrites.

use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::error::{DbError, DbResult};

/// Storage-assigned primary key.
pub type StudentId = i64;

/// Maximum `name` length in characters.
pub const NAME_MAX_LEN: usize = 100;

/// Maximum `grade` length in characters.
pub const GRADE_MAX_LEN: usize = 50;

pub(crate) const STUDENT_SELECT_SQL: &str = "SELECT id, name, age, grade, created_at FROM students";

/// A persisted student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub age: i32,
    pub grade: String,
    pub created_at: DateTime<Utc>,
}

impl Student {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            age: row.get("age")?,
            grade: row.get("grade")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// Caller-supplied student columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub age: i32,
    pub grade: String,
}

impl NewStudent {
    pub fn new(name: impl Into<String>, age: i32, grade: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age,
            grade: grade.into(),
        }
    }

    /// Checks the column constraints of the `students` table.
    pub fn validate(&self) -> DbResult<()> {
        if self.name.trim().is_empty() {
            return Err(DbError::Validation("name must not be empty".to_string()));
        }
        if self.name.chars().count() > NAME_MAX_LEN {
            return Err(DbError::Validation(format!(
                "name must be at most {} characters",
                NAME_MAX_LEN
            )));
        }
        if self.grade.chars().count() > GRADE_MAX_LEN {
            return Err(DbError::Validation(format!(
                "grade must be at most {} characters",
                GRADE_MAX_LEN
            )));
        }
        Ok(())
    }
}
