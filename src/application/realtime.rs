//! Realtime channel registry.
//!
//! Keeps one open channel per logical topic name so repeated subscriptions
//! share a single transport subscription. The registry is an ordinary value
//! owned by the application state and handed to the services that publish.
//!
//! ```text
//! subscribe("delivery-chat:42") ──► transport.join (first time only)
//! subscribe("delivery-chat:42") ──► resubscribe to the open channel
//! remove("delivery-chat:42")    ──► transport.leave + forget the name
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{broadcast, RwLock};

use crate::domain::business::{QueryFilter, TableRef};
use crate::ports::{PresenceState, RealtimeError, RealtimeEvent, RealtimeTransport};

/// Receiving side of a registered channel.
#[derive(Debug)]
pub struct Subscription {
    pub name: String,
    pub events: broadcast::Receiver<RealtimeEvent>,
    /// `false` when the channel was already open.
    pub newly_opened: bool,
}

pub struct ChannelRegistry {
    transport: Arc<dyn RealtimeTransport>,
    channels: RwLock<HashMap<String, broadcast::Receiver<RealtimeEvent>>>,
}

impl ChannelRegistry {
    pub fn new(transport: Arc<dyn RealtimeTransport>) -> Self {
        Self {
            transport,
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Opens `name` unless it is already open.
    pub async fn subscribe(&self, name: &str) -> Result<Subscription, RealtimeError> {
        let mut channels = self.channels.write().await;

        if let Some(existing) = channels.get(name) {
            return Ok(Subscription {
                name: name.to_string(),
                events: existing.resubscribe(),
                newly_opened: false,
            });
        }

        let receiver = self.transport.join(name).await?;
        let events = receiver.resubscribe();
        channels.insert(name.to_string(), receiver);
        tracing::debug!(channel = %name, "Channel opened");

        Ok(Subscription {
            name: name.to_string(),
            events,
            newly_opened: true,
        })
    }

    /// Publishes `event` on an open channel.
    pub async fn broadcast(
        &self,
        name: &str,
        event: &str,
        payload: Value,
    ) -> Result<usize, RealtimeError> {
        self.ensure_open(name).await?;
        self.transport
            .send(name, RealtimeEvent::broadcast(event, payload))
            .await
    }

    pub async fn track_presence(
        &self,
        name: &str,
        key: &str,
        state: Value,
    ) -> Result<(), RealtimeError> {
        self.ensure_open(name).await?;
        self.transport.track(name, key, state).await
    }

    pub async fn untrack_presence(&self, name: &str, key: &str) -> Result<(), RealtimeError> {
        self.ensure_open(name).await?;
        self.transport.untrack(name, key).await
    }

    pub async fn presence(&self, name: &str) -> Result<PresenceState, RealtimeError> {
        self.ensure_open(name).await?;
        self.transport.presence(name).await
    }

    /// Opens `name` and routes row changes of `table` to it.
    ///
    /// `filter` uses the `column=op.value` form, e.g. `id=eq.42`.
    pub async fn subscribe_row_changes(
        &self,
        name: &str,
        table: &TableRef,
        filter: Option<&str>,
    ) -> Result<Subscription, RealtimeError> {
        let filter = filter
            .map(|raw| {
                QueryFilter::parse(raw).ok_or_else(|| RealtimeError::InvalidFilter(raw.to_string()))
            })
            .transpose()?;

        let subscription = self.subscribe(name).await?;
        if subscription.newly_opened {
            self.transport.listen_row_changes(name, table, filter).await?;
        }
        Ok(subscription)
    }

    /// Leaves and forgets `name`. Returns `false` if it was not open.
    pub async fn remove(&self, name: &str) -> bool {
        if self.channels.write().await.remove(name).is_none() {
            return false;
        }
        if let Err(e) = self.transport.leave(name).await {
            tracing::warn!(channel = %name, error = %e, "Transport leave failed");
        }
        tracing::debug!(channel = %name, "Channel removed");
        true
    }

    pub async fn remove_all(&self) {
        let names: Vec<String> = self.channels.write().await.drain().map(|(n, _)| n).collect();
        for name in names {
            if let Err(e) = self.transport.leave(&name).await {
                tracing::warn!(channel = %name, error = %e, "Transport leave failed");
            }
        }
    }

    pub async fn is_subscribed(&self, name: &str) -> bool {
        self.channels.read().await.contains_key(name)
    }

    /// Open channel names, sorted.
    pub async fn channel_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    async fn ensure_open(&self, name: &str) -> Result<(), RealtimeError> {
        if self.is_subscribed(name).await {
            Ok(())
        } else {
            Err(RealtimeError::ChannelNotFound(name.to_string()))
        }
    }
}
