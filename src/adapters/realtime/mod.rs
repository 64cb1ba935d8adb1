//! Realtime Adapters
//!
//! - **InMemoryRealtimeTransport** - broadcast channels inside the process,
//!   used by the server and in tests

mod in_memory_transport;

pub use in_memory_transport::{InMemoryRealtimeTransport, DEFAULT_CHANNEL_CAPACITY};
