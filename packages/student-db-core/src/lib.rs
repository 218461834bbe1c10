//! Storage layer for the student records service.
//!
//! Provides the student record schema, embedded SQLite migrations,
//! and a pooled persistence gateway used by the HTTP handlers.

pub mod config;
pub mod error;
pub mod gateway;
pub mod migrations;
pub mod schema;

pub use config::DbConfig;
pub use error::{DbError, DbResult};
pub use gateway::StudentGateway;
pub use schema::{NewStudent, Student, StudentId};
