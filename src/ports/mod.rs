//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the application and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `KeyValueStore` - Whole-value storage under string keys
//! - `TrackingLinkLedger` - Pairings that already received a tracking link
//!
//! ## Backend Ports
//!
//! - `TableGateway` - Row CRUD over the hosted relational backend
//! - `RpcClient` - Stored procedure calls
//! - `AuthGateway` - Password sign-in and session
//!
//! ## Realtime Ports
//!
//! - `RealtimeTransport` - Named pub/sub channels with presence and row changes

mod auth_gateway;
mod key_value_store;
mod realtime_transport;
mod rpc_client;
mod table_gateway;
mod tracking_link_ledger;

pub use auth_gateway::{AuthGateway, AuthSession};
pub use key_value_store::{validate_key, KeyValueStore, StorageError};
pub use realtime_transport::{
    PresenceState, RealtimeError, RealtimeEvent, RealtimeTransport, RowChangeKind,
};
pub use rpc_client::RpcClient;
pub use table_gateway::{GatewayError, TableGateway};
pub use tracking_link_ledger::TrackingLinkLedger;
