//! # Error Handling Middleware
//!
//! Maps domain errors to HTTP status codes and `{ "error": message }` bodies so
//! every handler reports failures the same way.

use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use clinicbook_core::{errors::ClinicError, slots::SlotError};
use serde_json::json;
use tracing::error;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use clinicbook_api::middleware::error_handling::AppError;
/// use clinicbook_core::errors::ClinicError;
/// use uuid::Uuid;
///
/// async fn handler(id: Uuid) -> Result<Json<String>, AppError> {
///     Err(AppError(ClinicError::NotFound(format!("Doctor with ID {} not found", id))))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub ClinicError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ClinicError::NotFound(_) => StatusCode::NOT_FOUND,
            ClinicError::Validation(_) => StatusCode::BAD_REQUEST,
            ClinicError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ClinicError::Authorization(_) => StatusCode::FORBIDDEN,
            ClinicError::Conflict(_) => StatusCode::CONFLICT,
            ClinicError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ClinicError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {:?}", self.0);
        }

        // Client errors carry the bare message; server errors keep their category
        let message = match self.0 {
            ClinicError::NotFound(message)
            | ClinicError::Validation(message)
            | ClinicError::Authentication(message)
            | ClinicError::Authorization(message)
            | ClinicError::Conflict(message) => message,
            other => other.to_string(),
        };
        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}

impl From<ClinicError> for AppError {
    fn from(err: ClinicError) -> Self {
        AppError(err)
    }
}

/// Wraps eyre errors from repository calls as database errors.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(ClinicError::Database(err))
    }
}

impl From<SlotError> for AppError {
    fn from(err: SlotError) -> Self {
        AppError(err.into())
    }
}

/// Malformed path segments, such as a doctor id that is not a UUID.
impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError(ClinicError::Validation(rejection.body_text()))
    }
}

/// Malformed query strings, such as a non-numeric granularity.
impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError(ClinicError::Validation(rejection.body_text()))
    }
}

/// Maps a ClinicError to an HTTP response
pub fn map_error(err: ClinicError) -> Response {
    AppError(err).into_response()
}
