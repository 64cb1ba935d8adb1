//! Strongly-typed identifier value objects.
//!
//! Identifiers are string-backed. Decisions, options and rules were created
//! by browser clients that generated their own ids, and backend rows carry
//! whatever key the hosted database assigned, so no format is imposed on
//! parsing. Newly generated ids are UUID v4 strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Declares a string-backed identifier type.
///
/// The generated type is `#[serde(transparent)]`, implements `Display`,
/// `FromStr` (rejecting empty/blank strings) and `From<&str>`.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Wraps an existing identifier, rejecting blank strings.
            pub fn parse(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::empty_field($field));
                }
                Ok(Self(id))
            }

            /// Returns the inner string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Unique identifier for a decision.
    DecisionId,
    "decision_id"
);

string_id!(
    /// Unique identifier for an option within a decision.
    OptionId,
    "option_id"
);

string_id!(
    /// Unique identifier for a user-authored decision rule.
    RuleId,
    "rule_id"
);

string_id!(
    /// Delivery order identifier (assigned by the backend).
    OrderId,
    "order_id"
);

string_id!(
    /// Courier identifier (assigned by the backend).
    CourierId,
    "courier_id"
);

string_id!(
    /// Row identifier for a record in the hosted database.
    RecordId,
    "id"
);
