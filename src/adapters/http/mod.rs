//! HTTP adapters - REST and WebSocket API.
//!
//! Each feature has its own router; [`app_router`] merges them over a
//! shared [`AppState`].

pub mod decisions;
pub mod delivery;
pub mod error;
pub mod extract;
pub mod health;
pub mod preferences;

use std::sync::Arc;

use axum::Router;

use crate::application::{ChannelRegistry, DecisionService, DeliveryTracking, PreferencesRepository};

pub use decisions::decisions_router;
pub use delivery::delivery_router;
pub use error::{ApiError, ErrorResponse};
pub use extract::{ValidatedJson, ValidatedQuery};
pub use health::health_router;
pub use preferences::preferences_router;

/// Services shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub decisions: Arc<DecisionService>,
    pub preferences: PreferencesRepository,
    pub delivery: Arc<DeliveryTracking>,
    pub channels: Arc<ChannelRegistry>,
}

/// All routes, without middleware layers.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .merge(health_router())
        .merge(decisions_router())
        .merge(preferences_router())
        .merge(delivery_router())
        .with_state(state)
}
