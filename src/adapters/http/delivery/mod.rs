//! HTTP adapter for delivery tracking.
//!
//! # Endpoints
//!
//! - `POST /api/deliveries/:order_id/tracking-link` - send a tracking link once per courier
//! - `GET /api/deliveries/:order_id/live` - WebSocket on the order's location channel
//! - `GET /track/verify` - verify a signed tracking link

pub mod dto;
pub mod handlers;
pub mod live;
pub mod routes;

pub use routes::delivery_router;
