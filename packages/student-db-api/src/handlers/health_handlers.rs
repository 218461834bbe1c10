//! Liveness endpoint.

use hyper::body::Bytes;
use hyper::{Request, Response};

use crate::router::{AppState, RouterError};

use super::request_utils::{build_json_response, MatchitParams};
use super::response::HealthResponse;

/// Reports that the API process is serving requests.
///
/// Does not touch the database, so the answer is the same whatever the
/// stored records are.
///
/// # Endpoint
/// `GET /api/v1/healthcheck`
///
/// # Response
/// - **200 OK**: `{"status": "healthy"}`
pub async fn healthcheck<B>(
    _req: Request<B>,
    _params: MatchitParams<'_, '_>,
    _state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    build_json_response(200, &HealthResponse { status: "healthy" })
}
