//! Storage Adapters
//!
//! Implementations of the key/value and tracking link ledger ports.
//!
//! ## Available Adapters
//!
//! - **FileKeyValueStore** - One JSON file per key on disk
//! - **InMemoryKeyValueStore** - Entries in memory (testing/development)
//! - **InMemoryTrackingLinkLedger** - Sent pairings for the process lifetime
//! - **KeyValueTrackingLinkLedger** - Sent pairings persisted under `sentTrackingLinks`
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileKeyValueStore, KeyValueTrackingLinkLedger};
//!
//! let store = Arc::new(FileKeyValueStore::new("./data/kv"));
//! let ledger = KeyValueTrackingLinkLedger::new(store.clone());
//! ```

mod file_key_value_store;
mod in_memory_key_value_store;
mod tracking_link_ledgers;

pub use file_key_value_store::FileKeyValueStore;
pub use in_memory_key_value_store::InMemoryKeyValueStore;
pub use tracking_link_ledgers::{
    InMemoryTrackingLinkLedger, KeyValueTrackingLinkLedger, SENT_TRACKING_LINKS_KEY,
};
