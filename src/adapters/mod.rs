//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application to external systems:
//! - `storage` - key/value stores and tracking link ledgers
//! - `backend` - hosted Postgres REST/RPC client and in-memory tables
//! - `realtime` - channel transport
//! - `http` - REST and WebSocket API

pub mod backend;
pub mod http;
pub mod realtime;
pub mod storage;
