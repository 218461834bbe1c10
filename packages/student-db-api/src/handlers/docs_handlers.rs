//! API documentation endpoints.

use hyper::body::Bytes;
use hyper::{Request, Response};

use crate::openapi::{swagger_ui_html, SPEC_PATH};
use crate::router::{AppState, RouterError};

use super::request_utils::{build_json_response, build_response, MatchitParams};

/// Serves the generated OpenAPI document.
///
/// # Endpoint
/// `GET /apispec_1.json`
pub async fn openapi_spec<B>(
    _req: Request<B>,
    _params: MatchitParams<'_, '_>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    build_json_response(200, state.openapi.as_ref())
}

/// Serves the Swagger UI explorer.
///
/// # Endpoint
/// `GET /apidocs`
pub async fn swagger_ui<B>(
    _req: Request<B>,
    _params: MatchitParams<'_, '_>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let html = swagger_ui_html(&state.config.docs.title, SPEC_PATH);
    build_response(200, "text/html; charset=utf-8", html)
}
