//! Order chat messages.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{OrderId, Timestamp, ValidationError};

/// Maximum length of a chat message body, in characters.
pub const MAX_BODY_CHARS: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatSender {
    Courier,
    Customer,
    Support,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub order_id: OrderId,
    pub sender: ChatSender,
    pub sender_name: String,
    pub body: String,
    pub sent_at: Timestamp,
}

impl ChatMessage {
    pub fn new(
        order_id: OrderId,
        sender: ChatSender,
        sender_name: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let body = body.into();
        if body.trim().is_empty() {
            return Err(ValidationError::empty_field("body"));
        }
        let length = body.chars().count();
        if length > MAX_BODY_CHARS {
            return Err(ValidationError::out_of_range(
                "body",
                1,
                MAX_BODY_CHARS as i32,
                length.min(i32::MAX as usize) as i32,
            ));
        }
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            order_id,
            sender,
            sender_name: sender_name.into(),
            body,
            sent_at: Timestamp::now(),
        })
    }
}
