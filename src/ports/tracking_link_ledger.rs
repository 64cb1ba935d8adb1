//! Tracking link ledger port - which (order, courier) pairings already got a link.

use async_trait::async_trait;

use super::StorageError;

#[async_trait]
pub trait TrackingLinkLedger: Send + Sync {
    /// Records `pairing`. Returns `false` when it was already recorded.
    async fn record(&self, pairing: &str) -> Result<bool, StorageError>;

    async fn contains(&self, pairing: &str) -> Result<bool, StorageError>;

    /// Drops `pairing` so a link can be sent again.
    async fn forget(&self, pairing: &str) -> Result<(), StorageError>;
}
