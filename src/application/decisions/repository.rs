//! Whole-collection persistence of rules and decisions.
//!
//! Each collection is a JSON array under its own key and is replaced as a
//! whole on every save. Unreadable data is logged and treated as empty.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::decision::{Decision, DecisionBoard, DecisionRule};
use crate::ports::{KeyValueStore, StorageError};

pub const RULES_KEY: &str = "decisionRules";
pub const DECISIONS_KEY: &str = "decisions";

#[derive(Clone)]
pub struct DecisionRepository {
    store: Arc<dyn KeyValueStore>,
}

impl DecisionRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Loads both collections into a board.
    pub async fn load_board(&self) -> DecisionBoard {
        DecisionBoard::from_parts(self.load_rules().await, self.load_decisions().await)
    }

    pub async fn load_rules(&self) -> Vec<DecisionRule> {
        self.load_collection(RULES_KEY).await
    }

    pub async fn load_decisions(&self) -> Vec<Decision> {
        self.load_collection(DECISIONS_KEY).await
    }

    pub async fn save_rules(&self, rules: &[DecisionRule]) -> Result<(), StorageError> {
        self.save_collection(RULES_KEY, rules).await
    }

    pub async fn save_decisions(&self, decisions: &[Decision]) -> Result<(), StorageError> {
        self.save_collection(DECISIONS_KEY, decisions).await
    }

    async fn load_collection<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read collection, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding unparseable collection");
                Vec::new()
            }
        }
    }

    async fn save_collection<T: Serialize>(
        &self,
        key: &str,
        items: &[T],
    ) -> Result<(), StorageError> {
        let json =
            serde_json::to_string(items).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.set(key, &json).await
    }
}
