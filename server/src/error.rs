//! Error type returned by the store and the HTTP handlers.
//!
//! # Design
//! Every failure the service reports maps onto exactly one HTTP status.
//! `ApiError` implements `IntoResponse`, so handlers return
//! `Result<_, ApiError>` and the status plus a small JSON envelope
//! (`{"error": "...", "message": "..."}`) is produced in one place.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// A required field is missing or blank, a foreign key names no existing
    /// parent, or the body could not be decoded.
    #[error("{0}")]
    BadRequest(String),

    /// No record exists with the requested id.
    #[error("{0}")]
    NotFound(String),

    /// The record would duplicate the natural key of another record.
    #[error("{0}")]
    NotUnique(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::NotUnique(_) => StatusCode::CONFLICT,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::NotFound(_) => "not_found",
            ApiError::NotUnique(_) => "not_unique",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(status = status.as_u16(), "{self}");
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// Axum answers undecodable bodies with 422; callers of this service only
// ever see 400 for a payload they have to fix.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
