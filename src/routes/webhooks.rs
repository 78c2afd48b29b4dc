use std::collections::HashMap;

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    response::{ApiResponse, Meta},
    services::booking_service::{self, PaymentOutcome},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/payment", post(payment_webhook))
}

/// Provider event envelope; only the session object and its metadata matter.
#[derive(Debug, Deserialize, ToSchema)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookData,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct WebhookData {
    pub object: WebhookObject,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct WebhookObject {
    pub id: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

fn outcome_for(event_type: &str) -> Option<PaymentOutcome> {
    match event_type {
        "checkout.session.completed" => Some(PaymentOutcome::Confirmed),
        "checkout.session.expired" => Some(PaymentOutcome::Failed),
        _ => None,
    }
}

/// Providers retry on non-2xx responses, so every processable and
/// unprocessable event alike is acknowledged; reconciliation itself is
/// idempotent.
#[utoipa::path(
    post,
    path = "/webhooks/payment",
    request_body = WebhookEvent,
    responses(
        (status = 200, description = "Event acknowledged", body = ApiResponse<serde_json::Value>)
    ),
    tag = "Webhooks"
)]
pub async fn payment_webhook(
    State(state): State<AppState>,
    Json(event): Json<WebhookEvent>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    if let Some(outcome) = outcome_for(&event.event_type) {
        let booking_id = event
            .data
            .object
            .metadata
            .get("booking_id")
            .and_then(|raw| Uuid::parse_str(raw).ok());

        match booking_id {
            Some(booking_id) => {
                booking_service::reconcile_payment(&state, booking_id, outcome).await?;
            }
            None => {
                tracing::warn!(
                    session_id = %event.data.object.id,
                    event_type = %event.event_type,
                    "payment event without a usable booking id"
                );
            }
        }
    }

    Ok(Json(ApiResponse::success(
        "OK",
        serde_json::json!({ "received": true }),
        Some(Meta::empty()),
    )))
}
