//! Matchit routing configuration.

use std::sync::Arc;
use std::time::Instant;

use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use matchit::Router as MatchitRouter;
use serde_json::Value;

use crate::config::ApiConfig;
use crate::handlers;
use crate::handlers::request_utils::BoxError;
use crate::openapi::{self, DOCS_PATH, SPEC_PATH};
use student_db_core::StudentGateway;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Persistence gateway (owns the connection pool)
    pub gateway: StudentGateway,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Pre-rendered OpenAPI document
    pub openapi: Arc<Value>,
}

/// HTTP request router.
pub struct Router {
    inner: MatchitRouter<RouteHandler>,
    state: AppState,
}

impl Router {
    /// Creates a new router with default routes.
    pub fn new(gateway: StudentGateway, config: ApiConfig) -> Self {
        let mut router = MatchitRouter::new();

        router
            .insert("/api/v1/students", RouteHandler::Students)
            .expect("Failed to insert /api/v1/students route");
        router
            .insert("/api/v1/students/{id}", RouteHandler::Student)
            .expect("Failed to insert /api/v1/students/{id} route");
        router
            .insert("/api/v1/healthcheck", RouteHandler::Health)
            .expect("Failed to insert /api/v1/healthcheck route");

        // Documentation endpoints
        router
            .insert(SPEC_PATH, RouteHandler::Spec)
            .expect("Failed to insert spec route");
        router
            .insert(DOCS_PATH, RouteHandler::Docs)
            .expect("Failed to insert docs route");
        router
            .insert(format!("{}/", DOCS_PATH), RouteHandler::Docs)
            .expect("Failed to insert docs route");

        let openapi = Arc::new(openapi::openapi_document(&config.docs));

        Self {
            inner: router,
            state: AppState {
                gateway,
                config: Arc::new(config),
                openapi,
            },
        }
    }

    /// Shared state handed to every handler.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Routes a request and converts any error into its JSON error response.
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Bytes>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let started_at = Instant::now();
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        let response = match self.route(req).await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(%method, %path, error = %err, "Request failed");
                Response::from(err)
            }
        };

        tracing::info!(
            %method,
            %path,
            status = response.status().as_u16(),
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            "Handled request"
        );
        response
    }

    /// Routes an incoming request to the appropriate handler.
    ///
    /// # Arguments
    /// * `req` - HTTP request
    ///
    /// # Returns
    /// `Result<Response<Bytes>, RouterError>` containing the response or an error.
    pub async fn route<B>(&self, req: Request<B>) -> Result<Response<Bytes>, RouterError>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let path = req.uri().path().to_string();

        match self.inner.at(&path) {
            Ok(matched) => {
                let handler = matched.value;
                handler
                    .handle(req, matched.params, self.state.clone())
                    .await
            }
            Err(_) => Err(RouterError::NotFound(format!("No route found for {}", path))),
        }
    }
}

/// Route handler function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteHandler {
    Students,
    Student,
    Health,
    Spec,
    Docs,
}

impl RouteHandler {
    /// Handles a request with the given route parameters.
    async fn handle<B>(
        &self,
        req: Request<B>,
        params: matchit::Params<'_, '_>,
        state: AppState,
    ) -> Result<Response<Bytes>, RouterError>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let method = req.method().clone();
        match (self, method) {
            (RouteHandler::Students, Method::POST) => {
                handlers::create_student(req, params, state).await
            }
            (RouteHandler::Students, Method::GET) => {
                handlers::list_students(req, params, state).await
            }
            (RouteHandler::Student, Method::GET) => handlers::get_student(req, params, state).await,
            (RouteHandler::Student, Method::PUT) => {
                handlers::update_student(req, params, state).await
            }
            (RouteHandler::Student, Method::DELETE) => {
                handlers::delete_student(req, params, state).await
            }
            (RouteHandler::Health, Method::GET) => handlers::healthcheck(req, params, state).await,
            (RouteHandler::Spec, Method::GET) => handlers::openapi_spec(req, params, state).await,
            (RouteHandler::Docs, Method::GET) => handlers::swagger_ui(req, params, state).await,
            _ => Err(RouterError::MethodNotAllowed),
        }
    }
}

/// Router error type.
#[derive(Debug)]
pub enum RouterError {
    MethodNotAllowed,
    InternalError(String),
    Timeout,
    BadRequest {
        message: String,
        details: Option<String>,
    },
    NotFound(String),
    PayloadTooLarge(String),
    UnsupportedMediaType(String),
}

impl RouterError {
    /// HTTP status code for this error.
    pub fn status(&self) -> u16 {
        match self {
            RouterError::MethodNotAllowed => 405,
            RouterError::InternalError(_) => 500,
            RouterError::Timeout => 408,
            RouterError::BadRequest { .. } => 400,
            RouterError::NotFound(_) => 404,
            RouterError::PayloadTooLarge(_) => 413,
            RouterError::UnsupportedMediaType(_) => 415,
        }
    }
}

impl std::fmt::Display for RouterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouterError::MethodNotAllowed => write!(f, "Method Not Allowed"),
            RouterError::InternalError(msg) => write!(f, "Internal Error: {}", msg),
            RouterError::Timeout => write!(f, "Request Timeout"),
            RouterError::BadRequest {
                message,
                details: Some(details),
            } => write!(f, "Bad Request: {} ({})", message, details),
            RouterError::BadRequest { message, .. } => write!(f, "Bad Request: {}", message),
            RouterError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            RouterError::PayloadTooLarge(msg) => write!(f, "Payload Too Large: {}", msg),
            RouterError::UnsupportedMediaType(msg) => {
                write!(f, "Unsupported Media Type: {}", msg)
            }
        }
    }
}

impl std::error::Error for RouterError {}

impl From<RouterError> for Response<Bytes> {
    fn from(err: RouterError) -> Self {
        let status = err.status();
        let (message, details) = match err {
            RouterError::MethodNotAllowed => ("Method Not Allowed".to_string(), None),
            RouterError::Timeout => ("Request Timeout".to_string(), None),
            // Storage details stay in the logs.
            RouterError::InternalError(_) => ("Internal Server Error".to_string(), None),
            RouterError::BadRequest { message, details } => (message, details),
            RouterError::NotFound(msg)
            | RouterError::PayloadTooLarge(msg)
            | RouterError::UnsupportedMediaType(msg) => (msg, None),
        };

        let error_response = handlers::error_response(status, message, details);
        let body = serde_json::to_vec(&error_response).unwrap_or_else(|e| {
            format!(
                "{{\"success\":false,\"error\":{{\"code\":\"500\",\"message\":\"Failed to serialize error: {}\"}}}}",
                e
            )
            .into_bytes()
        });

        Response::builder()
            .status(status)
            .header(hyper::header::CONTENT_TYPE, "application/json")
            .body(Bytes::from(body))
            .unwrap_or_else(|_| {
                let mut fallback = Response::new(Bytes::from_static(b"Internal Server Error"));
                *fallback.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
                fallback
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openapi::OPERATIONS;

    fn test_router() -> Router {
        Router::new(
            StudentGateway::open_in_memory().unwrap(),
            ApiConfig::default(),
        )
    }

    #[test]
    fn test_every_documented_operation_is_routed() {
        let router = test_router();
        for op in OPERATIONS {
            let path = op.path.replace("{id}", "1");
            let matched = router.inner.at(&path).unwrap();
            let expected = if op.path.contains("{id}") {
                RouteHandler::Student
            } else if op.tag == "Health" {
                RouteHandler::Health
            } else {
                RouteHandler::Students
            };
            assert_eq!(*matched.value, expected, "{} {}", op.method, op.path);
        }
    }

    #[test]
    fn test_docs_routes_resolve() {
        let router = test_router();
        assert_eq!(*router.inner.at(SPEC_PATH).unwrap().value, RouteHandler::Spec);
        assert_eq!(*router.inner.at("/apidocs").unwrap().value, RouteHandler::Docs);
        assert_eq!(*router.inner.at("/apidocs/").unwrap().value, RouteHandler::Docs);
        assert!(router.inner.at("/api/v1/unknown").is_err());
    }

    #[test]
    fn test_error_statuses() {
        let cases = [
            (RouterError::MethodNotAllowed, 405),
            (RouterError::InternalError("db".to_string()), 500),
            (RouterError::Timeout, 408),
            (
                RouterError::BadRequest {
                    message: "x".to_string(),
                    details: None,
                },
                400,
            ),
            (RouterError::NotFound("x".to_string()), 404),
            (RouterError::PayloadTooLarge("x".to_string()), 413),
            (RouterError::UnsupportedMediaType("x".to_string()), 415),
        ];
        for (err, status) in cases {
            let response = Response::<Bytes>::from(err);
            assert_eq!(response.status().as_u16(), status);
        }
    }

    #[test]
    fn test_internal_error_hides_details() {
        let response = Response::<Bytes>::from(RouterError::InternalError(
            "SQLite error: disk I/O error".to_string(),
        ));
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["error"]["message"], "Internal Server Error");
    }

    #[test]
    fn test_bad_request_details_reach_the_body() {
        let response = Response::<Bytes>::from(RouterError::BadRequest {
            message: "Invalid request body".to_string(),
            details: Some("missing field `grade`".to_string()),
        });
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["error"]["code"], "400");
        assert_eq!(body["error"]["message"], "Invalid request body");
        assert_eq!(body["error"]["details"], "missing field `grade`");
    }
}
