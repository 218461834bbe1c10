//! REST API server for student records.
//!
//! Provides the HTTP endpoints for student CRUD operations, a health
//! check, generated OpenAPI documentation, and request routing.

pub mod config;
pub mod handlers;
pub mod openapi;
pub mod router;
pub mod server;
