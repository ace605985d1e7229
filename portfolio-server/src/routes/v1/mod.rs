pub mod chat;
pub mod push;

use crate::state::AppState;
use utoipa::OpenApi;

use axum::Router;
use std::sync::Arc;

/// Public routes nested under `/v1`.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().merge(chat::router()).merge(push::router())
}

#[derive(OpenApi)]
#[openapi()]
pub struct V1Api;

pub fn api_docs() -> utoipa::openapi::OpenApi {
    let mut spec = V1Api::openapi();
    spec.merge(chat::ChatApi::openapi());
    spec.merge(push::PushApi::openapi());
    spec
}
