//! Tracking link ledgers.
//!
//! `InMemoryTrackingLinkLedger` remembers pairings for the life of the
//! process. `KeyValueTrackingLinkLedger` keeps them as a JSON array under
//! the `sentTrackingLinks` key so they survive restarts.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::ports::{KeyValueStore, StorageError, TrackingLinkLedger};

pub const SENT_TRACKING_LINKS_KEY: &str = "sentTrackingLinks";

#[derive(Debug, Clone, Default)]
pub struct InMemoryTrackingLinkLedger {
    sent: Arc<Mutex<BTreeSet<String>>>,
}

impl InMemoryTrackingLinkLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TrackingLinkLedger for InMemoryTrackingLinkLedger {
    async fn record(&self, pairing: &str) -> Result<bool, StorageError> {
        Ok(self.sent.lock().await.insert(pairing.to_string()))
    }

    async fn contains(&self, pairing: &str) -> Result<bool, StorageError> {
        Ok(self.sent.lock().await.contains(pairing))
    }

    async fn forget(&self, pairing: &str) -> Result<(), StorageError> {
        self.sent.lock().await.remove(pairing);
        Ok(())
    }
}

/// Ledger persisted through a key/value store.
///
/// The set is loaded lazily on first use and written back whole after each
/// change. The mutex serializes read-modify-write cycles within the process.
pub struct KeyValueTrackingLinkLedger {
    store: Arc<dyn KeyValueStore>,
    sent: Mutex<Option<BTreeSet<String>>>,
}

impl KeyValueTrackingLinkLedger {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            sent: Mutex::new(None),
        }
    }

    async fn load(&self) -> Result<BTreeSet<String>, StorageError> {
        let Some(raw) = self.store.get(SENT_TRACKING_LINKS_KEY).await? else {
            return Ok(BTreeSet::new());
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(pairings) => Ok(pairings.into_iter().collect()),
            Err(e) => {
                tracing::warn!(
                    key = SENT_TRACKING_LINKS_KEY,
                    error = %e,
                    "Discarding unreadable tracking link ledger"
                );
                Ok(BTreeSet::new())
            }
        }
    }

    async fn save(&self, sent: &BTreeSet<String>) -> Result<(), StorageError> {
        let json = serde_json::to_string(&sent.iter().collect::<Vec<_>>())
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.set(SENT_TRACKING_LINKS_KEY, &json).await
    }
}

#[async_trait]
impl TrackingLinkLedger for KeyValueTrackingLinkLedger {
    async fn record(&self, pairing: &str) -> Result<bool, StorageError> {
        let mut guard = self.sent.lock().await;
        if guard.is_none() {
            *guard = Some(self.load().await?);
        }
        let Some(sent) = guard.as_mut() else {
            return Ok(false);
        };
        if sent.contains(pairing) {
            return Ok(false);
        }

        let mut next = sent.clone();
        next.insert(pairing.to_string());
        self.save(&next).await?;
        *sent = next;
        Ok(true)
    }

    async fn contains(&self, pairing: &str) -> Result<bool, StorageError> {
        let mut guard = self.sent.lock().await;
        if guard.is_none() {
            *guard = Some(self.load().await?);
        }
        Ok(guard.as_ref().is_some_and(|sent| sent.contains(pairing)))
    }

    async fn forget(&self, pairing: &str) -> Result<(), StorageError> {
        let mut guard = self.sent.lock().await;
        if guard.is_none() {
            *guard = Some(self.load().await?);
        }
        let Some(sent) = guard.as_mut() else {
            return Ok(());
        };
        if !sent.contains(pairing) {
            return Ok(());
        }

        let mut next = sent.clone();
        next.remove(pairing);
        self.save(&next).await?;
        *sent = next;
        Ok(())
    }
}
