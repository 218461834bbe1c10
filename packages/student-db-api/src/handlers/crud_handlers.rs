//! Student CRUD (Create, Read, Update, Delete) handlers.
//!
//! Each handler performs one gateway call, except update, which confirms the
//! record exists before looking at the request body.

use hyper::body::{Body, Bytes};
use hyper::{Request, Response};

use crate::router::{AppState, RouterError};

use super::request_utils::{
    build_json_response, parse_student_id, read_student_payload, run_gateway, BoxError,
    MatchitParams,
};
use super::response::{MessageResponse, StudentResponse};

/// Creates a new student.
///
/// # Endpoint
/// `POST /api/v1/students`
///
/// # Request Body
/// ```json
/// { "name": "John Doe", "age": 20, "grade": "A" }
/// ```
///
/// # Response
/// - **201 Created**: `{"message": "Student added successfully"}`
///
/// # Errors
/// - **400 Bad Request**: Missing, mistyped or unknown field
/// - **413 Payload Too Large**: Body exceeds the configured limit
/// - **415 Unsupported Media Type**: Body is not JSON
/// - **500 Internal Server Error**: Storage failure
///
/// # Example
/// ```bash
/// curl -X POST http://localhost:5000/api/v1/students \
///   -H "Content-Type: application/json" \
///   -d '{"name": "John Doe", "age": 20, "grade": "A"}'
/// ```
pub async fn create_student<B>(
    req: Request<B>,
    _params: MatchitParams<'_, '_>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let student = read_student_payload(req, &state.config).await?;

    let id = run_gateway(&state, move |gateway| gateway.insert(&student)).await?;
    tracing::info!(id, "Student created");

    build_json_response(
        201,
        &MessageResponse {
            message: "Student added successfully",
        },
    )
}

/// Lists all students in ascending id order.
///
/// # Endpoint
/// `GET /api/v1/students`
///
/// # Response
/// - **200 OK**: `[{"id": 1, "name": "John Doe", "age": 20, "grade": "A"}]`
pub async fn list_students<B>(
    _req: Request<B>,
    _params: MatchitParams<'_, '_>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let students = run_gateway(&state, |gateway| gateway.fetch_all()).await?;

    let body: Vec<StudentResponse> = students.into_iter().map(StudentResponse::from).collect();
    build_json_response(200, &body)
}

/// Reads one student.
///
/// # Endpoint
/// `GET /api/v1/students/{id}`
///
/// # Response
/// - **200 OK**: `{"id": 1, "name": "John Doe", "age": 20, "grade": "A"}`
///
/// # Errors
/// - **404 Not Found**: No student has this id
pub async fn get_student<B>(
    _req: Request<B>,
    params: MatchitParams<'_, '_>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let id = parse_student_id(&params)?;

    let student = run_gateway(&state, move |gateway| gateway.fetch_by_id(id)).await?;
    build_json_response(200, &StudentResponse::from(student))
}

/// Fully updates a student. All three fields are required.
///
/// An unknown id is reported as 404 whatever the body contains.
///
/// # Endpoint
/// `PUT /api/v1/students/{id}`
///
/// # Response
/// - **200 OK**: `{"message": "Student updated successfully"}`
///
/// # Errors
/// - **400 Bad Request**: Missing, mistyped or unknown field
/// - **404 Not Found**: No student has this id
/// - **413 Payload Too Large**: Body exceeds the configured limit
/// - **415 Unsupported Media Type**: Body is not JSON
pub async fn update_student<B>(
    req: Request<B>,
    params: MatchitParams<'_, '_>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let id = parse_student_id(&params)?;
    run_gateway(&state, move |gateway| gateway.fetch_by_id(id)).await?;

    let student = read_student_payload(req, &state.config).await?;
    run_gateway(&state, move |gateway| gateway.update(id, &student)).await?;
    tracing::info!(id, "Student updated");

    build_json_response(
        200,
        &MessageResponse {
            message: "Student updated successfully",
        },
    )
}

/// Deletes a student.
///
/// # Endpoint
/// `DELETE /api/v1/students/{id}`
///
/// # Response
/// - **200 OK**: `{"message": "Student deleted successfully"}`
///
/// # Errors
/// - **404 Not Found**: No student has this id
pub async fn delete_student<B>(
    _req: Request<B>,
    params: MatchitParams<'_, '_>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let id = parse_student_id(&params)?;

    run_gateway(&state, move |gateway| gateway.delete(id)).await?;
    tracing::info!(id, "Student deleted");

    build_json_response(
        200,
        &MessageResponse {
            message: "Student deleted successfully",
        },
    )
}
