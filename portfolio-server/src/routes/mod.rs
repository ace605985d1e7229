//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, per-request trace-ID injection)
//! - Optional Swagger UI / OpenAPI spec endpoint (disable with `PORTFOLIO_ENABLE_SWAGGER=false`)
//! - Health / heartbeat route
//! - Public `/v1` chat and push routes
//! - `/admin` routes (protected by bearer token when one is configured)
//! - `/webhooks` for the identity provider

mod admin;
pub mod doc;
mod health;
mod v1;
mod webhooks;

use crate::middleware::{cors, trace};
use crate::state::AppState;
use axum::{
    Router,
    middleware::{self},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use utoipa_swagger_ui::SwaggerUi;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .merge(health::router())
        .nest("/v1", v1::router())
        .nest("/admin", admin::router(state.clone()))
        .merge(webhooks::router());

    let mut app = Router::new().merge(api_router);

    if state.config.enable_swagger {
        app = app.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", doc::get_docs()));
    }

    app
        // Outermost layers execute first on the way in.
        .layer(ServiceBuilder::new().layer(cors::cors_layer(state.clone())))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            trace::trace_middleware,
        ))
        .with_state(state)
}
