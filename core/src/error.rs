//! Error types for the bookcase API client.
//!
//! # Design
//! The three failures a caller is expected to handle get dedicated variants:
//! `BadRequest` (400, the payload failed validation), `NotFound` (404) and
//! `NotUnique` (409, a natural key is already taken). Each carries the
//! server's message. Every other non-2xx response lands in `HttpError` with
//! the raw status code and body for debugging.

use thiserror::Error;

/// Errors returned by `EntityClient` parse methods and by `Transport`s.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server rejected the payload: a required field is missing or a
    /// foreign key names no existing record.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The record would duplicate another record's natural key.
    #[error("not unique: {0}")]
    NotUnique(String),

    /// The server returned a status no other variant covers.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(String),
}
