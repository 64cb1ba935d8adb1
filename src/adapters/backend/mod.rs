//! Backend Adapters
//!
//! Implementations of the table, RPC and auth ports.
//!
//! - **PostgrestClient** - HTTP client for the hosted backend
//! - **InMemoryTableGateway** - Local tables and registered functions (testing/development)

mod in_memory_tables;
mod postgrest_client;

pub use in_memory_tables::InMemoryTableGateway;
pub use postgrest_client::{PostgrestClient, PostgrestConfig};
