//! Push subscription registry and the notification trigger.
//!
//! With an admin token configured, the admin's own subscription is only
//! readable and writable with that token, and callers without it may only
//! notify the admin, with the default click URL.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use tracing::info;
use utoipa::OpenApi;

use crate::entities::{ADMIN_ID, PushSubscriptionStore};
use crate::error::ServerError;
use crate::middleware::auth;
use crate::push::DEFAULT_CLICK_URL;
use crate::schemas::v1::push::{NotifyRequest, PushSubscriptionResponse, VapidPublicKeyResponse};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(save_push_subscription, get_push_subscription, vapid_public_key, notify_user),
    components(schemas(NotifyRequest, PushSubscriptionResponse, VapidPublicKeyResponse))
)]
pub struct PushApi;

/// Register push routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/push/subscriptions/{user_id}",
            put(save_push_subscription).get(get_push_subscription),
        )
        .route("/push/vapid-public-key", get(vapid_public_key))
        .route("/push/notify", post(notify_user))
}

/// The admin's subscription belongs to whoever holds the admin token.
fn guard_subscription_owner(
    state: &AppState,
    headers: &HeaderMap,
    user_id: &str,
) -> Result<(), ServerError> {
    if user_id == ADMIN_ID && !auth::is_admin_request(&state.config, headers) {
        return Err(ServerError::Forbidden(
            "the admin subscription requires the admin token".into(),
        ));
    }
    Ok(())
}

#[utoipa::path(
    put,
    path = "/v1/push/subscriptions/{user_id}",
    tag = "push",
    params(("user_id" = String, Path, description = "User the subscription belongs to")),
    request_body(content = serde_json::Value, description = "Browser PushSubscription JSON, stored as-is"),
    responses(
        (status = 204, description = "Subscription stored (replaces any previous one)"),
        (status = 403, description = "Writing the admin subscription without the admin token"),
        (status = 500, description = "Store error"),
    )
)]
pub async fn save_push_subscription(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    Json(subscription): Json<serde_json::Value>,
) -> Result<StatusCode, ServerError> {
    guard_subscription_owner(&state, &headers, &user_id)?;
    state
        .store
        .save_push_subscription(&user_id, &subscription)
        .await?;
    info!(user_id = %user_id, "push subscription saved");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/v1/push/subscriptions/{user_id}",
    tag = "push",
    params(("user_id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Stored subscription", body = PushSubscriptionResponse),
        (status = 403, description = "Reading the admin subscription without the admin token"),
        (status = 404, description = "User has no subscription"),
    )
)]
pub async fn get_push_subscription(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Result<Json<PushSubscriptionResponse>, ServerError> {
    guard_subscription_owner(&state, &headers, &user_id)?;
    let record = state
        .store
        .get_push_subscription(&user_id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("no push subscription for '{user_id}'")))?;
    Ok(Json(record.to_response()))
}

#[utoipa::path(
    get,
    path = "/v1/push/vapid-public-key",
    tag = "push",
    responses((status = 200, description = "Application server key for PushManager.subscribe", body = VapidPublicKeyResponse))
)]
pub async fn vapid_public_key(State(state): State<Arc<AppState>>) -> Json<VapidPublicKeyResponse> {
    Json(VapidPublicKeyResponse {
        public_key: state.config.vapid.as_ref().map(|v| v.public_key.clone()),
    })
}

/// Queue a push to one user and return at once. The outcome is only logged.
#[utoipa::path(
    post,
    path = "/v1/push/notify",
    tag = "push",
    request_body = NotifyRequest,
    responses(
        (status = 202, description = "Notification queued"),
        (status = 403, description = "Without the admin token: target is not the admin, or a custom url was given"),
    )
)]
pub async fn notify_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<NotifyRequest>,
) -> Result<StatusCode, ServerError> {
    if !auth::is_admin_request(&state.config, &headers) {
        if req.user_id != ADMIN_ID {
            return Err(ServerError::Forbidden("only the admin may notify users".into()));
        }
        if req.url.as_deref().is_some_and(|u| u != DEFAULT_CLICK_URL) {
            return Err(ServerError::Forbidden(
                "only the admin may set the notification url".into(),
            ));
        }
    }

    state
        .notifier
        .spawn_push_to_user(req.user_id, req.title, req.body, req.url);
    Ok(StatusCode::ACCEPTED)
}
