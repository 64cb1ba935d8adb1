//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types
//! that form the vocabulary of the bizhub domain.

mod errors;
mod ids;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{CourierId, DecisionId, OptionId, OrderId, RecordId, RuleId};
pub use timestamp::Timestamp;
