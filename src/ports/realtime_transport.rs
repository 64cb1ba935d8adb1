//! Realtime transport port - named pub/sub channels.
//!
//! A channel carries broadcast events, presence changes and row-change
//! notifications. Ordering and delivery guarantees belong to the transport;
//! slow receivers may lag and lose events.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::domain::business::{QueryFilter, TableRef};
use crate::domain::foundation::ErrorCode;

/// Presence entries of a channel, keyed by presence key.
pub type PresenceState = HashMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RowChangeKind {
    Insert,
    Update,
    Delete,
}

/// Event delivered to channel subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RealtimeEvent {
    Broadcast {
        event: String,
        payload: Value,
    },
    PresenceJoin {
        key: String,
        state: Value,
    },
    PresenceLeave {
        key: String,
    },
    RowChange {
        table: String,
        change: RowChangeKind,
        record: Value,
    },
}

impl RealtimeEvent {
    pub fn broadcast(event: impl Into<String>, payload: Value) -> Self {
        RealtimeEvent::Broadcast {
            event: event.into(),
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RealtimeError {
    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    #[error("Invalid channel name: {0}")]
    InvalidChannel(String),

    #[error("Invalid row filter: {0}")]
    InvalidFilter(String),

    #[error("Realtime transport error: {0}")]
    Transport(String),
}

impl RealtimeError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RealtimeError::ChannelNotFound(_) => ErrorCode::ChannelNotFound,
            RealtimeError::InvalidChannel(_) | RealtimeError::InvalidFilter(_) => {
                ErrorCode::ValidationFailed
            }
            RealtimeError::Transport(_) => ErrorCode::NetworkError,
        }
    }
}

#[async_trait]
pub trait RealtimeTransport: Send + Sync {
    /// Joins `channel`, creating it on first use.
    async fn join(
        &self,
        channel: &str,
    ) -> Result<broadcast::Receiver<RealtimeEvent>, RealtimeError>;

    /// Publishes on a joined channel. Returns the number of receivers reached.
    async fn send(&self, channel: &str, event: RealtimeEvent) -> Result<usize, RealtimeError>;

    async fn track(&self, channel: &str, key: &str, state: Value) -> Result<(), RealtimeError>;

    async fn untrack(&self, channel: &str, key: &str) -> Result<(), RealtimeError>;

    async fn presence(&self, channel: &str) -> Result<PresenceState, RealtimeError>;

    /// Routes row changes of `table` (optionally filtered) to `channel`.
    async fn listen_row_changes(
        &self,
        channel: &str,
        table: &TableRef,
        filter: Option<QueryFilter>,
    ) -> Result<(), RealtimeError>;

    /// Leaves `channel`, dropping its presence and row listeners.
    async fn leave(&self, channel: &str) -> Result<(), RealtimeError>;
}
