pub mod app;
pub mod posts;
pub mod state;
pub mod users;

use axum::http::StatusCode;
use axum::Json;
use log::error;
use serde::Serialize;

use crate::error::PostlineError;

/// Error response structure with user-friendly message
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Maps application errors onto HTTP responses: descriptor errors are the
/// client's fault (400), uniqueness conflicts are 409, and anything touching
/// storage is a 500 with the detail kept in the server log.
pub fn map_error(err: PostlineError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, message) = match &err {
        e if e.is_client_error() => (StatusCode::BAD_REQUEST, err.to_string()),
        PostlineError::StorageUnavailable(db_err) => {
            error!("Database error: {db_err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error occurred".to_string(),
            )
        }
        PostlineError::IoError(io_err) => {
            error!("I/O error: {io_err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error occurred".to_string(),
            )
        }
        PostlineError::Error(msg) if msg.contains("already in use") => {
            (StatusCode::CONFLICT, msg.clone())
        }
        PostlineError::Error(msg) if msg.contains("pool") => {
            error!("Connection pool error: {msg}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database connection error".to_string(),
            )
        }
        PostlineError::Error(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    };

    (status, Json(ErrorResponse { error: message }))
}
