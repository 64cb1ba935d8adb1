//! Decision-specific error types.

use thiserror::Error;

use crate::domain::foundation::{
    DecisionId, DomainError, ErrorCode, OptionId, RuleId, ValidationError,
};

/// Errors raised by decision and rule operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecisionError {
    #[error("Decision not found: {0}")]
    NotFound(DecisionId),

    #[error("Option {option_id} not found in decision {decision_id}")]
    OptionNotFound {
        decision_id: DecisionId,
        option_id: OptionId,
    },

    #[error("Rule not found: {0}")]
    RuleNotFound(RuleId),

    #[error("Decision {0} is already completed")]
    AlreadyCompleted(DecisionId),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DecisionError {
    pub fn storage(message: impl Into<String>) -> Self {
        DecisionError::Storage(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            DecisionError::NotFound(_) => ErrorCode::DecisionNotFound,
            DecisionError::OptionNotFound { .. } => ErrorCode::OptionNotFound,
            DecisionError::RuleNotFound(_) => ErrorCode::RuleNotFound,
            DecisionError::AlreadyCompleted(_) => ErrorCode::DecisionCompleted,
            DecisionError::Validation(_) => ErrorCode::ValidationFailed,
            DecisionError::Storage(_) => ErrorCode::StorageError,
        }
    }
}

impl From<DecisionError> for DomainError {
    fn from(err: DecisionError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
