//! Route configuration for delivery endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::super::AppState;
use super::handlers::{send_tracking_link, verify_tracking_link};
use super::live::live_handler;

/// Creates the delivery router.
pub fn delivery_router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/deliveries/:order_id/tracking-link",
            post(send_tracking_link),
        )
        .route("/api/deliveries/:order_id/live", get(live_handler))
        .route("/track/verify", get(verify_tracking_link))
}
