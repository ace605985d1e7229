//! Admin inbox endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::entities::ChatStore;
use crate::error::ServerError;
use crate::schemas::admin::chats::ParticipantResponse;
use crate::schemas::v1::chat::MessageResponse;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(list_all_chats, list_participants),
    components(schemas(ParticipantResponse))
)]
pub struct ChatsAdminApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chats", get(list_all_chats))
        .route("/chats/participants", get(list_participants))
}

#[utoipa::path(
    get,
    path = "/admin/chats",
    tag = "admin",
    responses(
        (status = 200, description = "Every stored message, oldest first", body = Vec<MessageResponse>),
        (status = 401, description = "Unauthorised (admin token required)"),
    )
)]
pub async fn list_all_chats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MessageResponse>>, ServerError> {
    let messages = state.store.list_all_messages().await?;
    Ok(Json(messages.iter().map(|m| m.to_response()).collect()))
}

#[utoipa::path(
    get,
    path = "/admin/chats/participants",
    tag = "admin",
    responses(
        (status = 200, description = "Users with a conversation, most recent first", body = Vec<ParticipantResponse>),
        (status = 401, description = "Unauthorised (admin token required)"),
    )
)]
pub async fn list_participants(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ParticipantResponse>>, ServerError> {
    let participants = state.store.list_participants().await?;
    Ok(Json(participants.into_iter().map(Into::into).collect()))
}
