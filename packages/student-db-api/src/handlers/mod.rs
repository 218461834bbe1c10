//! HTTP endpoint implementations.

pub mod crud_handlers;
pub mod docs_handlers;
pub mod health_handlers;
pub mod request_utils;
pub mod response;

pub use crud_handlers::{
    create_student, delete_student, get_student, list_students, update_student,
};
pub use docs_handlers::{openapi_spec, swagger_ui};
pub use health_handlers::healthcheck;
pub use response::error_response;
