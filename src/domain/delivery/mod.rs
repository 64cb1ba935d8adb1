//! Delivery tracking domain.
//!
//! Payloads exchanged on the per-order realtime channels (courier location,
//! chat, call signalling), the channel naming scheme and signed tracking
//! links sent to customers.

mod call;
mod channels;
mod chat;
mod errors;
mod location;
mod tracking_link;

pub use call::{CallSignal, CallSignalKind};
pub use channels::{ChannelTopic, DELIVERIES_TABLE};
pub use chat::{ChatMessage, ChatSender};
pub use errors::LinkError;
pub use location::CourierLocation;
pub use tracking_link::{pairing_key, TrackingLink, TrackingLinkSigner};
