//! Theme preference endpoints.
//!
//! - `GET /api/preferences` - current theme and theme preferences
//! - `PUT /api/preferences` - replace either or both

use axum::extract::{Json, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::application::{Theme, ThemePreferences};

use super::error::ApiError;
use super::extract::ValidatedJson;
use super::AppState;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesResponse {
    pub theme: Theme,
    pub theme_preferences: ThemePreferences,
}

/// Fields left out of the body keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferencesRequest {
    #[serde(default)]
    pub theme: Option<Theme>,
    #[serde(default)]
    pub theme_preferences: Option<ThemePreferences>,
}

pub fn preferences_router() -> Router<AppState> {
    Router::new().route(
        "/api/preferences",
        get(get_preferences).put(update_preferences),
    )
}

/// GET /api/preferences
pub async fn get_preferences(State(state): State<AppState>) -> impl IntoResponse {
    Json(current(&state).await)
}

/// PUT /api/preferences
pub async fn update_preferences(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<UpdatePreferencesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(theme) = request.theme {
        state.preferences.set_theme(theme).await?;
    }
    if let Some(preferences) = &request.theme_preferences {
        state.preferences.set_theme_preferences(preferences).await?;
    }
    Ok(Json(current(&state).await))
}

async fn current(state: &AppState) -> PreferencesResponse {
    PreferencesResponse {
        theme: state.preferences.theme().await,
        theme_preferences: state.preferences.theme_preferences().await,
    }
}
