// Error handling module for the hotel booking service
// Provides the core error taxonomy and its HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::storage::StorageError;

/// Errors raised by the data-access core
///
/// Every manage, delete and read operation reports failures through this type.
/// Conflict and existence checks fail fast with `AlreadyExists`/`NotFound`
/// before any write is attempted; anything the storage layer rejects arrives
/// as `Storage`.
#[derive(Debug, Error)]
pub enum DataError {
    /// Input failed validation or referenced a row that does not exist
    ///
    /// `fields` holds the per-field errors when the validator rejected the input.
    #[error("{message}")]
    InvalidArgument {
        message: String,
        fields: Option<validator::ValidationErrors>,
    },

    /// Insert would duplicate a primary or natural key
    #[error("{entity} already exists")]
    AlreadyExists { entity: &'static str },

    /// Update or lookup targeted a primary key with no row
    #[error("{entity} with id {id} does not exist")]
    NotFound { entity: &'static str, id: i64 },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl DataError {
    pub fn invalid(message: impl Into<String>) -> Self {
        DataError::InvalidArgument {
            message: message.into(),
            fields: None,
        }
    }
}

/// Convert validator errors into an invalid-argument error
impl From<validator::ValidationErrors> for DataError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DataError::InvalidArgument {
            message: format!("Validation failed: {}", errors),
            fields: Some(errors),
        }
    }
}

/// Error type returned by HTTP handlers
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or invalid input
    /// Maps to HTTP 400 Bad Request
    BadRequest(String),

    /// Validator rejected the request; field errors go into `details`
    /// Maps to HTTP 400 Bad Request
    ValidationError(validator::ValidationErrors),

    /// Resource not found by ID
    /// Maps to HTTP 404 Not Found
    NotFound { resource: String, id: String },

    /// Duplicate resource conflict
    /// Maps to HTTP 409 Conflict
    Conflict { message: String },

    /// Storage failures; details are logged, never returned
    /// Maps to HTTP 500 Internal Server Error
    StorageError(StorageError),
}

/// Consistent error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "INVALID_ARGUMENT", "NOT_FOUND")
    pub error_code: String,

    /// Human-readable error message
    pub message: String,

    /// Omitted from JSON when None
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// ISO 8601 timestamp of when the error occurred
    pub timestamp: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = self.to_error_response();
        (status, Json(error_response)).into_response()
    }
}

impl ApiError {
    /// Convert ApiError to HTTP status code and ErrorResponse
    ///
    /// Logs at debug for expected client errors, warn for conflicts and
    /// error for storage failures.
    fn to_error_response(&self) -> (StatusCode, ErrorResponse) {
        let mut details = None;
        let (error_code, message) = match self {
            ApiError::BadRequest(message) => {
                debug!("Invalid argument: {}", message);
                ("INVALID_ARGUMENT", message.clone())
            }
            ApiError::ValidationError(errors) => {
                debug!("Validation error: {:?}", errors);
                details = serde_json::to_value(errors).ok();
                ("INVALID_ARGUMENT", format!("Validation failed: {}", errors))
            }
            ApiError::NotFound { resource, id } => {
                debug!("Resource not found: {} with id {}", resource, id);
                ("NOT_FOUND", format!("{} with id {} not found", resource, id))
            }
            ApiError::Conflict { message } => {
                warn!("Conflict error: {}", message);
                ("CONFLICT", message.clone())
            }
            ApiError::StorageError(storage_error) => {
                error!("Storage error: {:?}", storage_error);
                ("DATABASE_ERROR", "A database error occurred".to_string())
            }
        };

        (
            self.status_code(),
            ErrorResponse {
                error_code: error_code.to_string(),
                message,
                details,
                timestamp: Utc::now().to_rfc3339(),
            },
        )
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convert core errors to ApiError
impl From<DataError> for ApiError {
    fn from(error: DataError) -> Self {
        match error {
            DataError::InvalidArgument {
                fields: Some(errors),
                ..
            } => ApiError::ValidationError(errors),
            DataError::InvalidArgument { message, .. } => ApiError::BadRequest(message),
            DataError::AlreadyExists { entity } => ApiError::Conflict {
                message: format!("{} already exists", entity),
            },
            DataError::NotFound { entity, id } => ApiError::NotFound {
                resource: entity.to_string(),
                id: id.to_string(),
            },
            DataError::Storage(storage_error) => ApiError::StorageError(storage_error),
        }
    }
}
