//! JSON error responses shared by every HTTP adapter.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::application::{BusinessError, DeliveryError};
use crate::domain::decision::DecisionError;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::StorageError;

/// Error body returned by all endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Machine-readable code, e.g. `DECISION_NOT_FOUND`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::ValidationFailed.to_string(),
            message: message.into(),
        }
    }
}

/// Error type returned by handlers; renders as `ErrorResponse` JSON.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorResponse::bad_request(message),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// HTTP status for a domain error code.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed | ErrorCode::InvalidLink => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::DecisionNotFound
        | ErrorCode::OptionNotFound
        | ErrorCode::RuleNotFound
        | ErrorCode::ChannelNotFound
        | ErrorCode::RecordNotFound => StatusCode::NOT_FOUND,
        ErrorCode::DecisionCompleted | ErrorCode::AlreadySent => StatusCode::CONFLICT,
        ErrorCode::NetworkError
        | ErrorCode::BackendError
        | ErrorCode::StorageError
        | ErrorCode::Timeout
        | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let status = status_for(err.code);
        if status.is_server_error() {
            tracing::error!(code = %err.code, message = %err.message, "Request failed");
        }
        Self {
            status,
            body: ErrorResponse {
                code: err.code.to_string(),
                message: err.message,
            },
        }
    }
}

impl From<DecisionError> for ApiError {
    fn from(err: DecisionError) -> Self {
        DomainError::from(err).into()
    }
}

impl From<DeliveryError> for ApiError {
    fn from(err: DeliveryError) -> Self {
        DomainError::from(err).into()
    }
}

impl From<BusinessError> for ApiError {
    fn from(err: BusinessError) -> Self {
        DomainError::from(err).into()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        DomainError::new(err.code(), err.to_string()).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
