//! Liveness probe.
//!
//! Reports the build version, whether SQLite answers, and which optional
//! integrations are switched on. A dead database turns the probe red.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::error;
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_health))]
pub struct HealthApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(get_health))
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Database reachable", body = Value),
        (status = 503, description = "Database unreachable", body = Value),
    )
)]
pub async fn get_health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let database = match state.store.ping().await {
        Ok(()) => "ok",
        Err(e) => {
            error!(error = %e, "health check could not reach the database");
            "unavailable"
        }
    };
    let status = if database == "ok" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if status.is_success() { "ok" } else { "degraded" },
            "version": env!("CARGO_PKG_VERSION"),
            "database": database,
            "push": state.config.vapid.is_some(),
            "identityWebhookSigned": state.webhook_verifier.is_some(),
        })),
    )
}
