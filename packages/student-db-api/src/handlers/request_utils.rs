//! Request utilities for HTTP endpoints.

use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::CONTENT_TYPE;
use hyper::{Request, Response};
use serde::{Deserialize, Serialize};
use tokio::time;

use crate::config::ApiConfig;
use crate::router::{AppState, RouterError};
use student_db_core::{DbError, DbResult, NewStudent, StudentGateway, StudentId};

/// Type alias for matchit parameters with explicit lifetimes
pub type MatchitParams<'a, 'b> = matchit::Params<'a, 'b>;

/// Error type request bodies must convert into.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Body accepted by create and update. Every field is required and
/// unknown fields are rejected.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudentPayload {
    pub name: String,
    pub age: i32,
    pub grade: String,
}

impl From<StudentPayload> for NewStudent {
    fn from(payload: StudentPayload) -> Self {
        NewStudent::new(payload.name, payload.age, payload.grade)
    }
}

/// Reads the request body, failing once it exceeds `max_bytes` or takes
/// longer than `timeout_ms`.
pub async fn read_request_body_with_timeout<B>(
    req: Request<B>,
    timeout_ms: u64,
    max_bytes: usize,
) -> Result<Bytes, RouterError>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let timeout_duration = time::Duration::from_millis(timeout_ms);
    let limited = Limited::new(req.into_body(), max_bytes);
    let body = time::timeout(timeout_duration, limited.collect())
        .await
        .map_err(|_| RouterError::Timeout)?
        .map_err(|e| {
            if e.downcast_ref::<LengthLimitError>().is_some() {
                RouterError::PayloadTooLarge(format!(
                    "Request body exceeds {} bytes",
                    max_bytes
                ))
            } else {
                RouterError::InternalError(format!("Failed to read request body: {}", e))
            }
        })?;
    Ok(body.to_bytes())
}

/// Rejects requests whose `Content-Type` is not JSON.
///
/// Accepts `application/json` and `application/*+json`, with or without
/// parameters such as `charset`.
pub fn require_json_content_type<B>(req: &Request<B>) -> Result<(), RouterError> {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    let is_json = mime == "application/json"
        || (mime.starts_with("application/") && mime.ends_with("+json"));
    if is_json {
        Ok(())
    } else {
        Err(RouterError::UnsupportedMediaType(format!(
            "Expected application/json, got '{}'",
            content_type
        )))
    }
}

/// Reads and decodes a student body from a JSON request.
pub async fn read_student_payload<B>(
    req: Request<B>,
    config: &ApiConfig,
) -> Result<NewStudent, RouterError>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    require_json_content_type(&req)?;
    let body_bytes =
        read_request_body_with_timeout(req, config.request_timeout_ms, config.max_body_bytes)
            .await?;
    let payload: StudentPayload =
        serde_json::from_slice(&body_bytes).map_err(|e| RouterError::BadRequest {
            message: "Invalid request body".to_string(),
            details: Some(e.to_string()),
        })?;
    Ok(payload.into())
}

/// Parses the `{id}` route parameter.
///
/// A value that is not an integer cannot name a record, so it is reported
/// as not found rather than as a bad request.
pub fn parse_student_id(params: &MatchitParams<'_, '_>) -> Result<StudentId, RouterError> {
    let raw = params.get("id").unwrap_or("");
    raw.parse::<StudentId>()
        .map_err(|_| RouterError::NotFound(format!("Student with id '{}' not found", raw)))
}

/// Runs one gateway operation on the blocking thread pool.
pub async fn run_gateway<T, F>(state: &AppState, operation: F) -> Result<T, RouterError>
where
    F: FnOnce(&StudentGateway) -> DbResult<T> + Send + 'static,
    T: Send + 'static,
{
    let gateway = state.gateway.clone();
    tokio::task::spawn_blocking(move || operation(&gateway))
        .await
        .map_err(|e| map_db_error_to_router_error(DbError::TaskFailed(e.to_string())))?
        .map_err(map_db_error_to_router_error)
}

/// Map DbError to appropriate RouterError
pub fn map_db_error_to_router_error(e: DbError) -> RouterError {
    if !e.is_client_error() {
        tracing::error!(error = %e, "Storage operation failed");
        return RouterError::InternalError(format!("Storage error: {}", e));
    }
    match e {
        DbError::Validation(reason) => RouterError::BadRequest {
            message: "Invalid student".to_string(),
            details: Some(reason),
        },
        other => RouterError::NotFound(other.to_string()),
    }
}

/// Helper to build HTTP response with proper error handling
pub fn build_response(
    status: u16,
    content_type: &str,
    body: impl Into<Bytes>,
) -> Result<Response<Bytes>, RouterError> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, content_type)
        .body(body.into())
        .map_err(|e| RouterError::InternalError(format!("Failed to build response: {}", e)))
}

/// Serializes `value` and wraps it in a JSON response.
pub fn build_json_response<T: Serialize>(
    status: u16,
    value: &T,
) -> Result<Response<Bytes>, RouterError> {
    let json = serde_json::to_vec(value)
        .map_err(|e| RouterError::InternalError(format!("Failed to serialize response: {}", e)))?;
    build_response(status, "application/json", json)
}
