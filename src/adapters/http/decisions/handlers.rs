//! HTTP handlers for rule and decision endpoints.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::domain::decision::{
    DayPeriod, DecisionPatch, NewDecision, NewOption, NewRule, OptionPatch, RulePatch,
};
use crate::domain::foundation::{DecisionId, OptionId, RuleId};

use super::super::error::ApiError;
use super::super::extract::{ValidatedJson, ValidatedQuery};
use super::super::AppState;
use super::dto::{
    DecisionStatus, ListDecisionsQuery, ListRulesQuery, RecommendationQuery,
    RecommendationResponse, SelectOptionRequest,
};

// ════════════════════════════════════════════════════════════════════════════════
// Rules
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/rules
pub async fn list_rules(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<ListRulesQuery>,
) -> impl IntoResponse {
    let rules = match query.category_list() {
        Some(categories) => state.decisions.active_rules(&categories).await,
        None => state.decisions.rules().await,
    };
    Json(rules)
}

/// POST /api/rules
pub async fn create_rule(
    State(state): State<AppState>,
    ValidatedJson(new): ValidatedJson<NewRule>,
) -> Result<impl IntoResponse, ApiError> {
    let rule = state.decisions.add_rule(new).await?;
    Ok((StatusCode::CREATED, Json(rule)))
}

/// PATCH /api/rules/:id
pub async fn update_rule(
    State(state): State<AppState>,
    Path(id): Path<RuleId>,
    ValidatedJson(patch): ValidatedJson<RulePatch>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.decisions.update_rule(&id, patch).await?))
}

/// POST /api/rules/:id/toggle
pub async fn toggle_rule(
    State(state): State<AppState>,
    Path(id): Path<RuleId>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.decisions.toggle_rule(&id).await?))
}

/// DELETE /api/rules/:id
pub async fn delete_rule(
    State(state): State<AppState>,
    Path(id): Path<RuleId>,
) -> Result<impl IntoResponse, ApiError> {
    state.decisions.delete_rule(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ════════════════════════════════════════════════════════════════════════════════
// Decisions
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/decisions?status=pending|completed
pub async fn list_decisions(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<ListDecisionsQuery>,
) -> impl IntoResponse {
    let decisions = match query.status {
        Some(DecisionStatus::Pending) => state.decisions.pending_decisions().await,
        Some(DecisionStatus::Completed) => state.decisions.completed_decisions().await,
        None => state.decisions.decisions().await,
    };
    Json(decisions)
}

/// POST /api/decisions
pub async fn create_decision(
    State(state): State<AppState>,
    ValidatedJson(new): ValidatedJson<NewDecision>,
) -> Result<impl IntoResponse, ApiError> {
    let decision = state.decisions.add_decision(new).await?;
    Ok((StatusCode::CREATED, Json(decision)))
}

/// GET /api/decisions/:id
pub async fn get_decision(
    State(state): State<AppState>,
    Path(id): Path<DecisionId>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.decisions.decision(&id).await?))
}

/// PATCH /api/decisions/:id
pub async fn update_decision(
    State(state): State<AppState>,
    Path(id): Path<DecisionId>,
    ValidatedJson(patch): ValidatedJson<DecisionPatch>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.decisions.update_decision(&id, patch).await?))
}

/// DELETE /api/decisions/:id
pub async fn delete_decision(
    State(state): State<AppState>,
    Path(id): Path<DecisionId>,
) -> Result<impl IntoResponse, ApiError> {
    state.decisions.delete_decision(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/decisions/:id/options
pub async fn add_option(
    State(state): State<AppState>,
    Path(id): Path<DecisionId>,
    ValidatedJson(new): ValidatedJson<NewOption>,
) -> Result<impl IntoResponse, ApiError> {
    let option = state.decisions.add_option(&id, new).await?;
    Ok((StatusCode::CREATED, Json(option)))
}

/// PATCH /api/decisions/:id/options/:option_id
pub async fn update_option(
    State(state): State<AppState>,
    Path((id, option_id)): Path<(DecisionId, OptionId)>,
    ValidatedJson(patch): ValidatedJson<OptionPatch>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(
        state.decisions.update_option(&id, &option_id, patch).await?,
    ))
}

/// DELETE /api/decisions/:id/options/:option_id
pub async fn remove_option(
    State(state): State<AppState>,
    Path((id, option_id)): Path<(DecisionId, OptionId)>,
) -> Result<impl IntoResponse, ApiError> {
    state.decisions.remove_option(&id, &option_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/decisions/:id/select
pub async fn select_option(
    State(state): State<AppState>,
    Path(id): Path<DecisionId>,
    ValidatedJson(request): ValidatedJson<SelectOptionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(
        state.decisions.select_option(&id, &request.option_id).await?,
    ))
}

/// GET /api/decisions/:id/recommendation?period=dawn|day|night
pub async fn recommendation(
    State(state): State<AppState>,
    Path(id): Path<DecisionId>,
    ValidatedQuery(query): ValidatedQuery<RecommendationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let period = query.period.unwrap_or_else(DayPeriod::current);
    let recommendation = state.decisions.recommended_option(&id, period).await?;
    Ok(Json(RecommendationResponse {
        period,
        recommendation,
    }))
}
