//! Inbound webhooks from the identity provider.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{Value, json};
use tracing::{debug, info, warn};
use utoipa::OpenApi;

use crate::entities::UserStore;
use crate::error::ServerError;
use crate::identity::{IdentityEvent, SignatureError, WebhookVerifier};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(identity_webhook))]
pub struct WebhooksApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/webhooks/identity", post(identity_webhook))
}

fn verify_signature(
    verifier: &WebhookVerifier,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<(), SignatureError> {
    let header = |name: &'static str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .ok_or(SignatureError::MissingHeader(name))
    };
    verifier.verify(
        header("svix-id")?,
        header("svix-timestamp")?,
        header("svix-signature")?,
        body,
        Utc::now(),
    )
}

/// Upsert the user carried by a `user.created` / `user.updated` event.
#[utoipa::path(
    post,
    path = "/webhooks/identity",
    tag = "webhooks",
    request_body = Value,
    responses(
        (status = 200, description = "Event processed or ignored", body = Value),
        (status = 400, description = "Malformed payload"),
        (status = 401, description = "Signature verification failed"),
    )
)]
pub async fn identity_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ServerError> {
    if let Some(verifier) = &state.webhook_verifier {
        if let Err(e) = verify_signature(verifier, &headers, &body) {
            warn!(error = %e, "rejected identity webhook");
            return Err(ServerError::Unauthorized("invalid webhook signature".into()));
        }
    }

    let event: IdentityEvent = serde_json::from_slice(&body)
        .map_err(|e| ServerError::BadRequest(format!("invalid webhook payload: {e}")))?;

    if !event.is_user_upsert() {
        debug!(kind = %event.kind, "ignoring identity event");
        return Ok(Json(json!({ "handled": false })));
    }

    let user = event
        .to_user_record(Utc::now())
        .map_err(|e| ServerError::BadRequest(format!("invalid user object: {e}")))?;
    let clerk_user_id = user.clerk_user_id.clone();
    let role = user.role.clone();
    state.store.upsert_user(user).await?;

    info!(clerk_user_id = %clerk_user_id, role = %role, kind = %event.kind, "user synced from identity provider");
    Ok(Json(json!({ "handled": true })))
}
