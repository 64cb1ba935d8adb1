//! HTTP handlers for tracking links.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::TrackingLinkOutcome;
use crate::domain::foundation::{DomainError, ErrorCode, OrderId, Timestamp};

use super::super::error::ApiError;
use super::super::extract::{ValidatedJson, ValidatedQuery};
use super::super::AppState;
use super::dto::{SendTrackingLinkRequest, VerifiedLinkResponse, VerifyLinkQuery};

/// POST /api/deliveries/:order_id/tracking-link
///
/// 201 with the link when sent, 409 `ALREADY_SENT` when this courier
/// already sent one for the order.
pub async fn send_tracking_link(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
    ValidatedJson(request): ValidatedJson<SendTrackingLinkRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .delivery
        .send_tracking_link(&order_id, &request.courier_id, &request.customer_phone)
        .await?;

    match outcome {
        TrackingLinkOutcome::Sent { .. } => Ok((StatusCode::CREATED, Json(outcome))),
        TrackingLinkOutcome::AlreadySent => Err(DomainError::new(
            ErrorCode::AlreadySent,
            format!(
                "Tracking link for order {} and courier {} was already sent",
                order_id, request.courier_id
            ),
        )
        .into()),
    }
}

/// GET /track/verify?order=&courier=&exp=&sig=
pub async fn verify_tracking_link(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<VerifyLinkQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let verified =
        state
            .delivery
            .verify_tracking_link(&query.order, &query.courier, query.exp, &query.sig);
    if let Err(e) = verified {
        tracing::warn!(
            order_id = %query.order,
            courier_id = %query.courier,
            error = %e,
            "Rejected tracking link"
        );
        return Err(e.into());
    }

    Ok(Json(VerifiedLinkResponse {
        valid: true,
        order_id: query.order,
        courier_id: query.courier,
        expires_at: Timestamp::from_unix_secs(query.exp),
    }))
}
