//! In-process realtime transport.
//!
//! Each channel is a `tokio::sync::broadcast` channel plus its presence map
//! and row-change listeners. Row changes are injected with
//! [`InMemoryRealtimeTransport::publish_row_change`].
//!
//! ```text
//! delivery-location:42 ── broadcast ──► receiver (customer)
//!                                   └─► receiver (dispatch dashboard)
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{broadcast, RwLock};

use crate::domain::business::{QueryFilter, Row, TableRef};
use crate::ports::{PresenceState, RealtimeError, RealtimeEvent, RealtimeTransport, RowChangeKind};

/// Default buffer size for each channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 128;

struct ChannelState {
    sender: broadcast::Sender<RealtimeEvent>,
    presence: PresenceState,
    row_listeners: Vec<RowListener>,
}

struct RowListener {
    table: TableRef,
    filter: Option<QueryFilter>,
}

impl RowListener {
    fn accepts(&self, table: &TableRef, record: &Row) -> bool {
        &self.table == table && self.filter.as_ref().map_or(true, |f| f.matches(record))
    }
}

/// Realtime transport backed by in-process broadcast channels.
///
/// # Thread Safety
///
/// The channel map sits behind a `RwLock`; sends only take the read lock, so
/// publishing on different channels proceeds concurrently.
pub struct InMemoryRealtimeTransport {
    channels: RwLock<HashMap<String, ChannelState>>,
    capacity: usize,
}

impl InMemoryRealtimeTransport {
    /// Create a transport whose channels buffer `capacity` events.
    ///
    /// Receivers that fall more than `capacity` events behind lose the
    /// oldest ones.
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Delivers a row change to every channel listening on `table` whose
    /// filter accepts `record`. Returns the number of channels notified.
    pub async fn publish_row_change(
        &self,
        table: &TableRef,
        change: RowChangeKind,
        record: Row,
    ) -> usize {
        let channels = self.channels.read().await;
        let mut notified = 0;

        for (name, state) in channels.iter() {
            if !state.row_listeners.iter().any(|l| l.accepts(table, &record)) {
                continue;
            }
            let event = RealtimeEvent::RowChange {
                table: table.to_string(),
                change,
                record: Value::Object(record.clone()),
            };
            // No receivers is fine
            let _ = state.sender.send(event);
            tracing::debug!(channel = %name, table = %table, "Row change delivered");
            notified += 1;
        }
        notified
    }

    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }

    /// Number of live receivers on `channel` (0 if it doesn't exist).
    pub async fn receiver_count(&self, channel: &str) -> usize {
        self.channels
            .read()
            .await
            .get(channel)
            .map(|s| s.sender.receiver_count())
            .unwrap_or(0)
    }
}

impl Default for InMemoryRealtimeTransport {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

fn not_found(channel: &str) -> RealtimeError {
    RealtimeError::ChannelNotFound(channel.to_string())
}

#[async_trait]
impl RealtimeTransport for InMemoryRealtimeTransport {
    async fn join(
        &self,
        channel: &str,
    ) -> Result<broadcast::Receiver<RealtimeEvent>, RealtimeError> {
        if channel.trim().is_empty() {
            return Err(RealtimeError::InvalidChannel(channel.to_string()));
        }

        let mut channels = self.channels.write().await;
        let state = channels.entry(channel.to_string()).or_insert_with(|| {
            let (sender, _) = broadcast::channel(self.capacity);
            ChannelState {
                sender,
                presence: PresenceState::new(),
                row_listeners: Vec::new(),
            }
        });
        Ok(state.sender.subscribe())
    }

    async fn send(&self, channel: &str, event: RealtimeEvent) -> Result<usize, RealtimeError> {
        let channels = self.channels.read().await;
        let state = channels.get(channel).ok_or_else(|| not_found(channel))?;
        Ok(state.sender.send(event).unwrap_or(0))
    }

    async fn track(&self, channel: &str, key: &str, state: Value) -> Result<(), RealtimeError> {
        let mut channels = self.channels.write().await;
        let entry = channels.get_mut(channel).ok_or_else(|| not_found(channel))?;
        entry.presence.insert(key.to_string(), state.clone());
        let _ = entry.sender.send(RealtimeEvent::PresenceJoin {
            key: key.to_string(),
            state,
        });
        Ok(())
    }

    async fn untrack(&self, channel: &str, key: &str) -> Result<(), RealtimeError> {
        let mut channels = self.channels.write().await;
        let entry = channels.get_mut(channel).ok_or_else(|| not_found(channel))?;
        if entry.presence.remove(key).is_some() {
            let _ = entry.sender.send(RealtimeEvent::PresenceLeave {
                key: key.to_string(),
            });
        }
        Ok(())
    }

    async fn presence(&self, channel: &str) -> Result<PresenceState, RealtimeError> {
        let channels = self.channels.read().await;
        channels
            .get(channel)
            .map(|s| s.presence.clone())
            .ok_or_else(|| not_found(channel))
    }

    async fn listen_row_changes(
        &self,
        channel: &str,
        table: &TableRef,
        filter: Option<QueryFilter>,
    ) -> Result<(), RealtimeError> {
        let mut channels = self.channels.write().await;
        let entry = channels.get_mut(channel).ok_or_else(|| not_found(channel))?;
        entry.row_listeners.push(RowListener {
            table: table.clone(),
            filter,
        });
        Ok(())
    }

    async fn leave(&self, channel: &str) -> Result<(), RealtimeError> {
        // Dropping the sender closes every receiver of the channel
        self.channels
            .write()
            .await
            .remove(channel)
            .map(|_| ())
            .ok_or_else(|| not_found(channel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn broadcast_reaches_all_receivers() {
        let transport = InMemoryRealtimeTransport::new(16);
        let mut a = transport.join("room").await.unwrap();
        let mut b = transport.join("room").await.unwrap();

        let reached = transport
            .send("room", RealtimeEvent::broadcast("ping", json!({"n": 1})))
            .await
            .unwrap();

        assert_eq!(reached, 2);
        assert_eq!(a.recv().await.unwrap(), RealtimeEvent::broadcast("ping", json!({"n": 1})));
        assert_eq!(b.recv().await.unwrap(), RealtimeEvent::broadcast("ping", json!({"n": 1})));
    }

    #[tokio::test]
    async fn send_to_unknown_channel_fails() {
        let transport = InMemoryRealtimeTransport::default();
        let result = transport
            .send("missing", RealtimeEvent::broadcast("x", Value::Null))
            .await;
        assert_eq!(result, Err(RealtimeError::ChannelNotFound("missing".to_string())));
    }

    #[tokio::test]
    async fn send_without_receivers_reaches_nobody() {
        let transport = InMemoryRealtimeTransport::default();
        drop(transport.join("room").await.unwrap());
        let reached = transport
            .send("room", RealtimeEvent::broadcast("x", Value::Null))
            .await
            .unwrap();
        assert_eq!(reached, 0);
    }

    #[tokio::test]
    async fn presence_tracks_and_untracks() {
        let transport = InMemoryRealtimeTransport::default();
        let mut rx = transport.join("room").await.unwrap();

        transport.track("room", "courier-1", json!({"online": true})).await.unwrap();
        assert_eq!(transport.presence("room").await.unwrap().len(), 1);
        assert!(matches!(rx.recv().await.unwrap(), RealtimeEvent::PresenceJoin { .. }));

        transport.untrack("room", "courier-1").await.unwrap();
        assert!(transport.presence("room").await.unwrap().is_empty());
        assert_eq!(
            rx.recv().await.unwrap(),
            RealtimeEvent::PresenceLeave { key: "courier-1".to_string() }
        );
    }

    #[tokio::test]
    async fn row_changes_respect_table_and_filter() {
        let transport = InMemoryRealtimeTransport::default();
        let mut rx = transport.join("status:42").await.unwrap();
        transport
            .listen_row_changes(
                "status:42",
                &TableRef::parse("deliveries"),
                QueryFilter::parse("id=eq.42"),
            )
            .await
            .unwrap();

        let other = json!({"id": 7, "status": "delivered"}).as_object().cloned().unwrap();
        let ours = json!({"id": 42, "status": "in_transit"}).as_object().cloned().unwrap();

        let deliveries = TableRef::parse("deliveries");
        assert_eq!(
            transport.publish_row_change(&deliveries, RowChangeKind::Update, other).await,
            0
        );
        assert_eq!(
            transport.publish_row_change(&deliveries, RowChangeKind::Update, ours).await,
            1
        );

        match rx.recv().await.unwrap() {
            RealtimeEvent::RowChange { table, change, record } => {
                assert_eq!(table, "deliveries");
                assert_eq!(change, RowChangeKind::Update);
                assert_eq!(record["status"], "in_transit");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn leave_closes_receivers() {
        let transport = InMemoryRealtimeTransport::default();
        let mut rx = transport.join("room").await.unwrap();
        transport.leave("room").await.unwrap();

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Closed)
        ));
        assert_eq!(transport.channel_count().await, 0);
    }

    #[tokio::test]
    async fn blank_channel_name_is_rejected() {
        let transport = InMemoryRealtimeTransport::default();
        assert!(matches!(
            transport.join(" ").await,
            Err(RealtimeError::InvalidChannel(_))
        ));
    }
}
