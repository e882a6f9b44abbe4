use axum::{Json, body::Bytes, extract::State, http::HeaderMap};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    services::order_service,
    state::AppState,
};

pub const COMPLETED_EVENT: &str = "checkout.session.completed";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WebhookAck {
    pub received: bool,
}

/// Payment-provider callback. Verifies the signature over the raw body before
/// reading anything, then applies the post-payment update for completed
/// checkouts. Every other event type is acknowledged and ignored.
#[utoipa::path(
    post,
    path = "/stripe",
    request_body(content = String, description = "Raw provider event payload", content_type = "application/json"),
    responses(
        (status = 200, description = "Event acknowledged", body = WebhookAck),
        (status = 400, description = "Signature verification failed"),
        (status = 500, description = "Valid event but the post-payment update failed")
    ),
    tag = "Webhooks"
)]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<WebhookAck>> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::WebhookSignature("missing stripe-signature header".into()))?;

    let event = state
        .stripe
        .verify_event(&body, signature)
        .map_err(|err| AppError::WebhookSignature(err.to_string()))?;

    if event.event_type == COMPLETED_EVENT {
        let metadata = event.data.object.metadata;
        let order_id = parse_metadata_id(metadata.order_id.as_deref(), "orderId")?;
        let user_id = parse_metadata_id(metadata.user_id.as_deref(), "userId")?;

        order_service::confirm_checkout(&state, order_id, user_id).await?;
    } else {
        tracing::info!(event_type = %event.event_type, "unhandled webhook event type");
    }

    Ok(Json(WebhookAck { received: true }))
}

/// The event itself verified, so a missing or mangled id is a post-payment
/// update failure rather than a signature rejection.
fn parse_metadata_id(value: Option<&str>, field: &str) -> AppResult<Uuid> {
    value
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .ok_or_else(|| {
            AppError::WebhookUpdate(anyhow::anyhow!("missing or invalid {field} metadata"))
        })
}
