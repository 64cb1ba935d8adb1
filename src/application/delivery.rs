//! Delivery tracking over the channel registry.
//!
//! Every order gets up to four channels (location, chat, call, status), all
//! opened through the shared [`ChannelRegistry`] so that a second caller
//! asking for the same topic reuses the open channel. Tracking links are
//! sent at most once per (order, courier) pairing, as recorded by the
//! [`TrackingLinkLedger`].
//!
//! Live location watchers are counted per order; the location channel is
//! closed when the last watcher leaves.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::business::TableRef;
use crate::domain::delivery::{
    pairing_key, CallSignal, ChannelTopic, ChatMessage, CourierLocation, LinkError, TrackingLink,
    TrackingLinkSigner, DELIVERIES_TABLE,
};
use crate::domain::foundation::{
    CourierId, DomainError, ErrorCode, OrderId, Timestamp, ValidationError,
};
use crate::ports::{GatewayError, RealtimeError, RpcClient, StorageError, TrackingLinkLedger};

use super::realtime::{ChannelRegistry, Subscription};

/// Broadcast event carrying a [`CourierLocation`].
pub const LOCATION_EVENT: &str = "location-update";
/// Broadcast event carrying a [`ChatMessage`].
pub const CHAT_EVENT: &str = "chat-message";
/// Backend function that delivers a tracking link to the customer.
pub const SEND_TRACKING_LINK_FN: &str = "delivery.send_tracking_link";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeliveryError {
    #[error(transparent)]
    Realtime(#[from] RealtimeError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Tracking link ledger failed: {0}")]
    Ledger(#[from] StorageError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Link(#[from] LinkError),
}

impl DeliveryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            DeliveryError::Realtime(e) => e.code(),
            DeliveryError::Validation(_) => ErrorCode::ValidationFailed,
            DeliveryError::Ledger(e) => e.code(),
            DeliveryError::Gateway(e) => e.code(),
            DeliveryError::Link(e) => e.code(),
        }
    }
}

impl From<DeliveryError> for DomainError {
    fn from(err: DeliveryError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}

/// Result of asking for a tracking link to be sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrackingLinkOutcome {
    Sent { link: TrackingLink },
    AlreadySent,
}

pub struct DeliveryTracking {
    registry: Arc<ChannelRegistry>,
    ledger: Arc<dyn TrackingLinkLedger>,
    rpc: Arc<dyn RpcClient>,
    signer: TrackingLinkSigner,
    /// Channels opened through this layer, for `end_all`.
    opened: Mutex<BTreeSet<String>>,
    /// Live watchers per location channel.
    watchers: Mutex<HashMap<String, usize>>,
}

impl DeliveryTracking {
    pub fn new(
        registry: Arc<ChannelRegistry>,
        ledger: Arc<dyn TrackingLinkLedger>,
        rpc: Arc<dyn RpcClient>,
        signer: TrackingLinkSigner,
    ) -> Self {
        Self {
            registry,
            ledger,
            rpc,
            signer,
            opened: Mutex::new(BTreeSet::new()),
            watchers: Mutex::new(HashMap::new()),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Location
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn start_location_tracking(
        &self,
        order: &OrderId,
    ) -> Result<Subscription, DeliveryError> {
        self.open(ChannelTopic::Location, order).await
    }

    /// Publishes a courier position. Tracking must have been started.
    pub async fn update_courier_location(
        &self,
        location: &CourierLocation,
    ) -> Result<usize, DeliveryError> {
        location.validate()?;
        let channel = ChannelTopic::Location.channel_name(&location.order_id);
        let payload = to_payload(location)?;
        Ok(self.registry.broadcast(&channel, LOCATION_EVENT, payload).await?)
    }

    pub async fn end_location_tracking(&self, order: &OrderId) -> bool {
        self.watchers
            .lock()
            .await
            .remove(&ChannelTopic::Location.channel_name(order));
        self.close(ChannelTopic::Location, order).await
    }

    /// Starts location tracking on behalf of one live client.
    ///
    /// Pair every successful call with [`Self::unwatch_location`].
    pub async fn watch_location(&self, order: &OrderId) -> Result<Subscription, DeliveryError> {
        let channel = ChannelTopic::Location.channel_name(order);
        let mut watchers = self.watchers.lock().await;
        let subscription = self.open(ChannelTopic::Location, order).await?;
        *watchers.entry(channel).or_insert(0) += 1;
        Ok(subscription)
    }

    /// Releases one live client. Returns true when it was the last one and
    /// the location channel was closed.
    pub async fn unwatch_location(&self, order: &OrderId) -> bool {
        let channel = ChannelTopic::Location.channel_name(order);
        let mut watchers = self.watchers.lock().await;
        match watchers.get_mut(&channel) {
            Some(count) if *count > 1 => {
                *count -= 1;
                false
            }
            Some(_) => {
                watchers.remove(&channel);
                let closed = self.close(ChannelTopic::Location, order).await;
                if closed {
                    tracing::info!(order_id = %order, "Last live watcher left, location closed");
                }
                closed
            }
            None => false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Chat
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn start_chat(&self, order: &OrderId) -> Result<Subscription, DeliveryError> {
        self.open(ChannelTopic::Chat, order).await
    }

    pub async fn send_chat_message(&self, message: &ChatMessage) -> Result<usize, DeliveryError> {
        let channel = ChannelTopic::Chat.channel_name(&message.order_id);
        let payload = to_payload(message)?;
        Ok(self.registry.broadcast(&channel, CHAT_EVENT, payload).await?)
    }

    pub async fn end_chat(&self, order: &OrderId) -> bool {
        self.close(ChannelTopic::Chat, order).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Call signalling
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn start_call_signaling(
        &self,
        order: &OrderId,
    ) -> Result<Subscription, DeliveryError> {
        self.open(ChannelTopic::Call, order).await
    }

    /// Relays an offer, answer, ICE candidate or hangup.
    pub async fn send_call_signal(&self, signal: &CallSignal) -> Result<usize, DeliveryError> {
        let channel = ChannelTopic::Call.channel_name(&signal.order_id);
        let payload = to_payload(signal)?;
        Ok(self
            .registry
            .broadcast(&channel, signal.kind.event_name(), payload)
            .await?)
    }

    /// Sends a hangup and closes the call channel.
    pub async fn end_call(&self, order: &OrderId, from: &str) -> bool {
        let hangup = CallSignal::hangup(order.clone(), from);
        if let Err(e) = self.send_call_signal(&hangup).await {
            tracing::debug!(order_id = %order, error = %e, "Hangup not delivered");
        }
        self.close(ChannelTopic::Call, order).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Status
    // ─────────────────────────────────────────────────────────────────────────

    /// Row changes of the order's delivery row.
    pub async fn watch_order_status(&self, order: &OrderId) -> Result<Subscription, DeliveryError> {
        let channel = ChannelTopic::Status.channel_name(order);
        let filter = ChannelTopic::status_filter(order);
        let subscription = self
            .registry
            .subscribe_row_changes(&channel, &TableRef::parse(DELIVERIES_TABLE), Some(&filter))
            .await?;
        self.opened.lock().await.insert(channel);
        Ok(subscription)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tracking links
    // ─────────────────────────────────────────────────────────────────────────

    /// Sends a tracking link to the customer unless this pairing already got one.
    ///
    /// The pairing is recorded before the backend call and forgotten again
    /// if the call fails, so a failed send can be retried.
    pub async fn send_tracking_link(
        &self,
        order: &OrderId,
        courier: &CourierId,
        customer_phone: &str,
    ) -> Result<TrackingLinkOutcome, DeliveryError> {
        if customer_phone.trim().is_empty() {
            return Err(ValidationError::empty_field("customerPhone").into());
        }

        let key = pairing_key(order, courier);
        if !self.ledger.record(&key).await? {
            tracing::info!(pairing = %key, "Tracking link already sent");
            return Ok(TrackingLinkOutcome::AlreadySent);
        }

        let link = self.signer.issue(order, courier);
        let args = json!({
            "order_id": order,
            "courier_id": courier,
            "customer_phone": customer_phone,
            "url": link.url,
            "expires_at": link.expires_at,
        });

        if let Err(e) = self.rpc.call(SEND_TRACKING_LINK_FN, args).await {
            tracing::warn!(pairing = %key, error = %e, "Tracking link send failed");
            if let Err(forget) = self.ledger.forget(&key).await {
                tracing::error!(pairing = %key, error = %forget, "Failed to release pairing");
            }
            return Err(e.into());
        }

        tracing::info!(pairing = %key, "Tracking link sent");
        Ok(TrackingLinkOutcome::Sent { link })
    }

    pub fn verify_tracking_link(
        &self,
        order: &OrderId,
        courier: &CourierId,
        exp: i64,
        signature: &str,
    ) -> Result<(), DeliveryError> {
        Ok(self
            .signer
            .verify(order, courier, exp, signature, Timestamp::now())?)
    }

    /// Closes every channel opened through this layer.
    pub async fn end_all(&self) {
        self.watchers.lock().await.clear();
        let channels = std::mem::take(&mut *self.opened.lock().await);
        for channel in channels {
            self.registry.remove(&channel).await;
        }
    }

    async fn open(
        &self,
        topic: ChannelTopic,
        order: &OrderId,
    ) -> Result<Subscription, DeliveryError> {
        let channel = topic.channel_name(order);
        let subscription = self.registry.subscribe(&channel).await?;
        if subscription.newly_opened {
            tracing::info!(order_id = %order, topic = %topic, "Delivery channel opened");
        }
        self.opened.lock().await.insert(channel);
        Ok(subscription)
    }

    async fn close(&self, topic: ChannelTopic, order: &OrderId) -> bool {
        let channel = topic.channel_name(order);
        self.opened.lock().await.remove(&channel);
        self.registry.remove(&channel).await
    }
}

fn to_payload<T: Serialize>(value: &T) -> Result<serde_json::Value, DeliveryError> {
    serde_json::to_value(value).map_err(|e| {
        DeliveryError::Validation(ValidationError::invalid_format("payload", e.to_string()))
    })
}
