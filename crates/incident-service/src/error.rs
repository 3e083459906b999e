//! Error types for request handling
//!
//! Every handler failure maps to exactly one status class. Nothing is
//! retried; the caller sees the error as returned.

use incident_model::{TransitionError, ValidationError};
use serde_json::{json, Value};
use thiserror::Error;

use crate::store::StoreError;

/// Request handling error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// No acting user could be identified
    #[error("Unauthorized")]
    Unauthenticated,

    /// The acting user's ability denies the operation
    #[error("{0}")]
    Forbidden(String),

    /// The addressed entity does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// Storage failure or other unexpected condition
    #[error("Internal error: {0}")]
    Unexpected(String),
}

/// Result type for request handling.
pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Plain ability denial.
    pub fn forbidden() -> Self {
        ServiceError::Forbidden("Forbidden".to_string())
    }

    /// Missing entity of the given kind.
    pub fn not_found(entity: impl Into<String>) -> Self {
        ServiceError::NotFound(entity.into())
    }

    /// Check if this error should be logged at error level.
    ///
    /// Client errors are expected and are not logged as errors.
    pub fn is_server_error(&self) -> bool {
        matches!(self, ServiceError::Unexpected(_))
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Unauthenticated => 401,
            ServiceError::Forbidden(_) => 403,
            ServiceError::NotFound(_) => 404,
            ServiceError::Validation(_) => 400,
            ServiceError::Unexpected(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::Unauthenticated => "UNAUTHORIZED",
            ServiceError::Forbidden(_) => "FORBIDDEN",
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::Validation(_) => "VALIDATION_ERROR",
            ServiceError::Unexpected(_) => "INTERNAL_ERROR",
        }
    }

    /// JSON body of the error response (`{"error": message}`).
    ///
    /// Unexpected errors carry the underlying message.
    pub fn to_body(&self) -> Value {
        json!({ "error": self.to_string() })
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(entity) => ServiceError::NotFound(entity),
            StoreError::Conflict(message) => ServiceError::Validation(message),
            StoreError::Unavailable(message) => ServiceError::Unexpected(message),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

impl From<TransitionError> for ServiceError {
    fn from(err: TransitionError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ServiceError::Unauthenticated.status_code(), 401);
        assert_eq!(ServiceError::forbidden().status_code(), 403);
        assert_eq!(ServiceError::not_found("Incident").status_code(), 404);
        assert_eq!(ServiceError::Validation("x".into()).status_code(), 400);
        assert_eq!(ServiceError::Unexpected("x".into()).status_code(), 500);
        assert!(ServiceError::Unexpected("x".into()).is_server_error());
        assert!(!ServiceError::forbidden().is_server_error());
    }

    #[test]
    fn test_error_bodies() {
        assert_eq!(ServiceError::Unauthenticated.to_body(), json!({"error": "Unauthorized"}));
        assert_eq!(ServiceError::forbidden().to_body(), json!({"error": "Forbidden"}));
        assert_eq!(
            ServiceError::not_found("Incident").to_body(),
            json!({"error": "Incident not found"})
        );
        assert_eq!(
            ServiceError::Unexpected("connection reset".into()).to_body(),
            json!({"error": "Internal error: connection reset"})
        );
    }

    #[test]
    fn test_store_failure_body_keeps_cause() {
        let body = ServiceError::from(StoreError::Unavailable("connection refused".into())).to_body();
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("connection refused"));
    }

    #[test]
    fn test_conversions() {
        let err: ServiceError = StoreError::Conflict("Report reason already exists".into()).into();
        assert_eq!(err.status_code(), 400);

        let err: ServiceError = StoreError::Unavailable("lock poisoned".into()).into();
        assert_eq!(err.error_code(), "INTERNAL_ERROR");

        let err: ServiceError = ValidationError::MissingRequiredFields.into();
        assert_eq!(err.to_string(), "reportReasonId and details are required");
    }
}
