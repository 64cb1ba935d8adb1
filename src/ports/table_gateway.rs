//! Table gateway port - row CRUD against the hosted relational backend.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::business::{Query, Row, RowError, TableRef};
use crate::domain::foundation::{DomainError, ErrorCode};

/// Errors from backend calls.
///
/// Network failures are their own variant, distinct from errors the backend
/// reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("No matching row in {0}")]
    NotFound(String),

    #[error(transparent)]
    Row(#[from] RowError),

    #[error("Invalid backend response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    pub fn code(&self) -> ErrorCode {
        match self {
            GatewayError::Network(_) => ErrorCode::NetworkError,
            GatewayError::Timeout(_) => ErrorCode::Timeout,
            GatewayError::Unauthorized(_) => ErrorCode::Unauthorized,
            GatewayError::NotFound(_) => ErrorCode::RecordNotFound,
            GatewayError::Backend { .. }
            | GatewayError::Row(_)
            | GatewayError::InvalidResponse(_) => ErrorCode::BackendError,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, GatewayError::Network(_) | GatewayError::Timeout(_))
    }
}

impl From<GatewayError> for DomainError {
    fn from(err: GatewayError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}

#[async_trait]
pub trait TableGateway: Send + Sync {
    async fn select(&self, table: &TableRef, query: &Query) -> Result<Vec<Row>, GatewayError>;

    /// First row matching `query`, if any.
    async fn select_one(
        &self,
        table: &TableRef,
        query: &Query,
    ) -> Result<Option<Row>, GatewayError> {
        let query = query.clone().limit(1);
        Ok(self.select(table, &query).await?.into_iter().next())
    }

    /// Inserts `row` and returns it as stored.
    async fn insert(&self, table: &TableRef, row: Row) -> Result<Row, GatewayError>;

    /// Merges `patch` into every matching row and returns the updated rows.
    async fn update(
        &self,
        table: &TableRef,
        query: &Query,
        patch: Row,
    ) -> Result<Vec<Row>, GatewayError>;

    /// Deletes matching rows and returns how many were removed.
    async fn delete(&self, table: &TableRef, query: &Query) -> Result<usize, GatewayError>;
}
