//! Voice-call signalling payloads relayed between courier and customer.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{OrderId, Timestamp};

/// Signalling step. The SDP/ICE payload itself is opaque to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallSignalKind {
    Offer,
    Answer,
    IceCandidate,
    Hangup,
}

impl CallSignalKind {
    /// Event name used on the call channel.
    pub fn event_name(&self) -> &'static str {
        match self {
            CallSignalKind::Offer => "call-offer",
            CallSignalKind::Answer => "call-answer",
            CallSignalKind::IceCandidate => "ice-candidate",
            CallSignalKind::Hangup => "call-hangup",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSignal {
    pub order_id: OrderId,
    pub kind: CallSignalKind,
    /// Participant sending the signal.
    pub from: String,
    #[serde(default)]
    pub payload: serde_json::Value,
    pub sent_at: Timestamp,
}

impl CallSignal {
    pub fn new(
        order_id: OrderId,
        kind: CallSignalKind,
        from: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            order_id,
            kind,
            from: from.into(),
            payload,
            sent_at: Timestamp::now(),
        }
    }

    pub fn hangup(order_id: OrderId, from: impl Into<String>) -> Self {
        Self::new(order_id, CallSignalKind::Hangup, from, serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_channel_events() {
        assert_eq!(CallSignalKind::Offer.event_name(), "call-offer");
        assert_eq!(CallSignalKind::IceCandidate.event_name(), "ice-candidate");
    }

    #[test]
    fn kind_deserializes_kebab_case() {
        let kind: CallSignalKind = serde_json::from_str("\"ice-candidate\"").unwrap();
        assert_eq!(kind, CallSignalKind::IceCandidate);
    }
}
