//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the
//! application. Every handler returns `Result<_, AppError>`, and the
//! `ResponseError` implementation turns each variant into the JSON envelope
//! `{"success": false, "message": ...}` with the matching HTTP status.
//!
//! `From` implementations for `sqlx::Error`, `validator::ValidationErrors`,
//! `bcrypt::BcryptError` and the storage error type allow handlers to use
//! the `?` operator throughout.

use actix_web::{error::ResponseError, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::storage::StorageError;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Bad or missing input, including duplicate registration (HTTP 400).
    Validation(String),
    /// Missing, malformed, or expired credentials (HTTP 401).
    Unauthorized(String),
    /// The requested task does not exist or is not owned by the caller
    /// (HTTP 404). The two cases are deliberately indistinguishable so
    /// existence is not leaked to non-owners.
    NotFound(String),
    /// The server is missing required configuration, e.g. the token
    /// signing secret (HTTP 500).
    Configuration(String),
    /// A relational or object-store operation failed (HTTP 500).
    Storage(String),
    /// Any other unexpected server-side failure (HTTP 500).
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "Validation: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Configuration(msg) => write!(f, "Configuration: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Validation(msg) => HttpResponse::BadRequest().json(json!({
                "success": false,
                "message": msg
            })),
            AppError::Unauthorized(msg) => HttpResponse::Unauthorized().json(json!({
                "success": false,
                "message": msg
            })),
            AppError::NotFound(msg) => HttpResponse::NotFound().json(json!({
                "success": false,
                "message": msg
            })),
            AppError::Configuration(msg) => HttpResponse::InternalServerError().json(json!({
                "success": false,
                "message": msg
            })),
            // Storage details are not leaked to the client.
            AppError::Storage(_) => HttpResponse::InternalServerError().json(json!({
                "success": false,
                "message": "internal server error"
            })),
            AppError::Internal(_) => HttpResponse::InternalServerError().json(json!({
                "success": false,
                "message": "internal server error"
            })),
        }
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` maps to `NotFound`; everything else is a storage failure.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("record not found".into()),
            _ => AppError::Storage(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::Validation(error.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(error.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(error: StorageError) -> AppError {
        AppError::Storage(error.to_string())
    }
}
