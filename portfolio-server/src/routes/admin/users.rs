use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::entities::UserStore;
use crate::error::ServerError;
use crate::schemas::admin::users::UserResponse;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(list_users, get_user), components(schemas(UserResponse)))]
pub struct UsersApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{user_id}", get(get_user))
}

#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "admin",
    responses(
        (status = 200, description = "All users synced from the identity provider", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorised (admin token required)"),
    )
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserResponse>>, ServerError> {
    let users = state.store.list_users().await?;
    Ok(Json(users.iter().map(|u| u.to_response()).collect()))
}

#[utoipa::path(
    get,
    path = "/admin/users/{user_id}",
    tag = "admin",
    params(("user_id" = String, Path, description = "Identity-provider user id")),
    responses(
        (status = 200, description = "The synced user", body = UserResponse),
        (status = 401, description = "Unauthorised (admin token required)"),
        (status = 404, description = "User has not been synced"),
    )
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ServerError> {
    let user = state
        .store
        .get_user(&user_id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("no user '{user_id}'")))?;
    Ok(Json(user.to_response()))
}
