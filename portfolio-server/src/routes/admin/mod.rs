pub mod chats;
pub mod users;

use crate::middleware::auth;
use crate::state::AppState;

use axum::{
    Router,
    middleware::{self},
};
use std::sync::Arc;
use utoipa::OpenApi;

// Routes nested under `/admin` (inbox, user directory).
pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .merge(chats::router())
        .merge(users::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ))
        .with_state(state)
}

#[derive(OpenApi)]
#[openapi()]
pub struct AdminApi;

pub fn api_docs() -> utoipa::openapi::OpenApi {
    let mut spec = AdminApi::openapi();
    spec.merge(chats::ChatsAdminApi::openapi());
    spec.merge(users::UsersApi::openapi());
    spec
}
