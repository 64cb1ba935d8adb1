//! Decision and rule use cases.
//!
//! - `DecisionRepository` - collection persistence over a key-value store
//! - `DecisionService` - board operations with write-through persistence

mod repository;
mod service;

pub use repository::{DecisionRepository, DECISIONS_KEY, RULES_KEY};
pub use service::DecisionService;
