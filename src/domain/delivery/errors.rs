//! Tracking-link errors.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Reasons a tracking link fails verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("Malformed tracking link: {0}")]
    Malformed(String),

    #[error("Tracking link signature is invalid")]
    InvalidSignature,

    #[error("Tracking link expired at {0}")]
    Expired(i64),
}

impl LinkError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::InvalidLink
    }
}

impl From<LinkError> for DomainError {
    fn from(err: LinkError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
