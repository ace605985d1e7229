use crate::middleware::trace::X_TRACE_ID;
use crate::state::AppState;
use axum::http::{HeaderName, HeaderValue, Method, header};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Browser clients are the portfolio front end: JSON bodies, an optional
/// admin bearer token, and the SSE stream.
pub fn cors_layer(state: Arc<AppState>) -> CorsLayer {
    let origin = match allowed_origins(state.config.cors_allowed_origins.as_deref()) {
        Some(origins) => AllowOrigin::list(origins),
        // Wildcard; set PORTFOLIO_CORS_ORIGINS in production.
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .expose_headers([HeaderName::from_static(X_TRACE_ID)])
}

/// `None` means "any origin": either nothing was configured or nothing in
/// the list parsed as a header value.
fn allowed_origins(raw: Option<&str>) -> Option<Vec<HeaderValue>> {
    let origins: Vec<HeaderValue> = raw?
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();
    (!origins.is_empty()).then_some(origins)
}
