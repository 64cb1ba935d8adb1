//! HTTP adapter for rules and decisions.
//!
//! # Endpoints
//!
//! - `GET/POST /api/rules`, `PATCH/DELETE /api/rules/:id`, `POST /api/rules/:id/toggle`
//! - `GET/POST /api/decisions`, `GET/PATCH/DELETE /api/decisions/:id`
//! - `POST /api/decisions/:id/options`, `PATCH/DELETE /api/decisions/:id/options/:option_id`
//! - `POST /api/decisions/:id/select`
//! - `GET /api/decisions/:id/recommendation?period=dawn|day|night`

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::decisions_router;
