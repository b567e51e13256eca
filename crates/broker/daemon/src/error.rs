//! Error types for broker-daemon

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use broker_ledger::{FaultClass, LedgerError};
use serde::Serialize;
use thiserror::Error;

/// Daemon-level errors
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server startup error
    #[error("Server error: {0}")]
    Server(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// API-level errors, mapped straight onto protocol responses
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or semantically invalid request; also covers the
    /// protocol's not-found class, which this broker version surfaces as a
    /// bad request (the ledgers log the distinction)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Divergent resubmission of a live id
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Protocol precondition not met (missing API version header)
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// Backing-resource failure; the ledger rolled back, a retry is safe
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err.class() {
            FaultClass::Validation | FaultClass::NotFound => ApiError::BadRequest(err.to_string()),
            FaultClass::Conflict => ApiError::Conflict(err.to_string()),
            FaultClass::Provisioner => ApiError::Internal(err.to_string()),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub description: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BadRequest"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "Conflict"),
            ApiError::PreconditionFailed(_) => {
                (StatusCode::PRECONDITION_FAILED, "PreconditionFailed")
            }
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "InternalError"),
        };

        let body = ErrorResponse {
            error: code.to_string(),
            description: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type alias for daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;

#[cfg(test)]
mod tests {
    use super::*;
    use broker_ledger::ProvisionerError;
    use broker_types::InstanceId;

    #[test]
    fn ledger_classes_map_to_protocol_statuses() {
        let api: ApiError = LedgerError::InstanceNotFound(InstanceId::new("i")).into();
        assert!(matches!(api, ApiError::BadRequest(_)));

        let api: ApiError = LedgerError::Conflict {
            id: "i".to_string(),
            detail: "plan_id".to_string(),
        }
        .into();
        assert!(matches!(api, ApiError::Conflict(_)));

        let api: ApiError =
            LedgerError::Provisioner(ProvisionerError::Backend("down".to_string())).into();
        assert!(matches!(api, ApiError::Internal(_)));
    }

    #[test]
    fn api_error_status_codes() {
        assert_eq!(
            ApiError::BadRequest("x".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Conflict("x".to_string()).into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::PreconditionFailed("x".to_string())
                .into_response()
                .status(),
            StatusCode::PRECONDITION_FAILED
        );
    }
}
