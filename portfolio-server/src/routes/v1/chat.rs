//! Visitor ↔ admin chat routes.
//!
//! Sending a message only stores it and wakes live subscribers; push
//! notifications are a separate call (`POST /v1/push/notify`).

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::{Stream, StreamExt};
use tracing::{info, warn};
use utoipa::OpenApi;

use crate::entities::participant::conversation_key;
use crate::entities::{ChatStore, NewChatMessage, Participant};
use crate::error::ServerError;
use crate::middleware::auth;
use crate::schemas::v1::chat::{MessageResponse, SendMessageRequest};
use crate::state::AppState;

const SSE_KEEP_ALIVE: Duration = Duration::from_secs(15);

#[derive(OpenApi)]
#[openapi(
    paths(send_message, get_chat, conversation_events),
    components(schemas(SendMessageRequest, MessageResponse))
)]
pub struct ChatApi;

/// Register chat routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chat/messages", post(send_message))
        .route("/chat/conversations/{user_id}", get(get_chat))
        .route("/chat/conversations/{user_id}/events", get(conversation_events))
}

#[utoipa::path(
    post,
    path = "/v1/chat/messages",
    tag = "chat",
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message stored", body = MessageResponse),
        (status = 400, description = "Neither or both sides are the admin"),
        (status = 403, description = "Sending as admin without the admin token"),
        (status = 500, description = "Store error"),
    )
)]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ServerError> {
    let from = Participant::from(req.from);
    let to = Participant::from(req.to);

    let user_id = conversation_key(&from, &to)
        .map(str::to_owned)
        .ok_or_else(|| {
            ServerError::BadRequest("a message must be exchanged between the admin and one user".into())
        })?;

    if from.is_admin() && !auth::is_admin_request(&state.config, &headers) {
        return Err(ServerError::Forbidden("only the admin may send as admin".into()));
    }

    let stored = state
        .store
        .append_message(NewChatMessage {
            from,
            to,
            message: req.message,
            from_name: req.from_name,
            from_image: req.from_image,
        })
        .await?;

    state.feed.publish(&user_id);
    info!(id = %stored.id, from = %stored.from, to = %stored.to, "chat message stored");

    Ok((StatusCode::CREATED, Json(stored.to_response())))
}

#[utoipa::path(
    get,
    path = "/v1/chat/conversations/{user_id}",
    tag = "chat",
    params(("user_id" = String, Path, description = "Visitor user id")),
    responses(
        (status = 200, description = "Conversation, oldest first", body = Vec<MessageResponse>),
        (status = 500, description = "Store error"),
    )
)]
pub async fn get_chat(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<MessageResponse>>, ServerError> {
    let messages = state.store.conversation(&user_id).await?;
    Ok(Json(messages.iter().map(|m| m.to_response()).collect()))
}

/// Live version of [`get_chat`]: a `conversation` SSE event with the full
/// snapshot on connect and after every new message.
#[utoipa::path(
    get,
    path = "/v1/chat/conversations/{user_id}/events",
    tag = "chat",
    params(("user_id" = String, Path, description = "Visitor user id")),
    responses(
        (status = 200, description = "Server-sent `conversation` events", content_type = "text/event-stream"),
    )
)]
pub async fn conversation_events(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let snapshots = state.feed.watch(Arc::clone(&state.store), user_id.clone());

    let events = snapshots.map(move |snapshot| {
        let event = match snapshot {
            Ok(messages) => {
                let body: Vec<MessageResponse> = messages.iter().map(|m| m.to_response()).collect();
                Event::default()
                    .event("conversation")
                    .json_data(body)
                    .unwrap_or_else(|e| Event::default().event("error").data(e.to_string()))
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "live conversation query failed");
                Event::default()
                    .event("error")
                    .data("failed to load conversation")
            }
        };
        Ok::<Event, Infallible>(event)
    });

    Sse::new(events).keep_alive(KeepAlive::new().interval(SSE_KEEP_ALIVE))
}
