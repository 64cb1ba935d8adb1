//! Channel naming for per-order delivery topics.

use std::fmt;

use crate::domain::foundation::OrderId;

/// Table whose row changes carry delivery status updates.
pub const DELIVERIES_TABLE: &str = "deliveries";

/// The realtime topics opened for a single order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelTopic {
    Location,
    Chat,
    Call,
    Status,
}

impl ChannelTopic {
    pub const ALL: [ChannelTopic; 4] = [
        ChannelTopic::Location,
        ChannelTopic::Chat,
        ChannelTopic::Call,
        ChannelTopic::Status,
    ];

    fn prefix(&self) -> &'static str {
        match self {
            ChannelTopic::Location => "delivery-location",
            ChannelTopic::Chat => "delivery-chat",
            ChannelTopic::Call => "delivery-call",
            ChannelTopic::Status => "delivery-status",
        }
    }

    /// Channel name for `order`, e.g. `delivery-location:42`.
    pub fn channel_name(&self, order: &OrderId) -> String {
        format!("{}:{}", self.prefix(), order)
    }

    /// Row filter selecting the delivery row of `order`.
    pub fn status_filter(order: &OrderId) -> String {
        format!("id=eq.{}", order)
    }
}

impl fmt::Display for ChannelTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}
