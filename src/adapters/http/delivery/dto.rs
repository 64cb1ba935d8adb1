//! Request and response bodies for delivery endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CourierId, OrderId, Timestamp};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTrackingLinkRequest {
    pub courier_id: CourierId,
    pub customer_phone: String,
}

/// Query string of a tracking link.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyLinkQuery {
    pub order: OrderId,
    pub courier: CourierId,
    pub exp: i64,
    pub sig: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedLinkResponse {
    pub valid: bool,
    pub order_id: OrderId,
    pub courier_id: CourierId,
    pub expires_at: Timestamp,
}
