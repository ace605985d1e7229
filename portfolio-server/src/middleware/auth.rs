//! Bearer-token guard for admin-only operations.
//!
//! With no `PORTFOLIO_ADMIN_TOKEN` configured everything is open, which is
//! meant for local development only.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::config::Config;
use crate::error::ServerError;
use crate::state::AppState;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// `true` when no admin token is configured or the request carries it.
pub fn is_admin_request(config: &Config, headers: &HeaderMap) -> bool {
    match &config.admin_token {
        None => true,
        Some(expected) => bearer_token(headers) == Some(expected.as_str()),
    }
}

pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !is_admin_request(&state.config, req.headers()) {
        return ServerError::Unauthorized("unauthorised".into()).into_response();
    }
    next.run(req).await
}

#[cfg(test)]
mod test {
    use super::*;

    fn headers(auth: Option<&str>) -> HeaderMap {
        let mut h = HeaderMap::new();
        if let Some(v) = auth {
            h.insert(header::AUTHORIZATION, v.parse().unwrap());
        }
        h
    }

    #[test]
    fn open_without_configured_token() {
        let cfg = Config::default();
        assert!(is_admin_request(&cfg, &headers(None)));
    }

    #[test]
    fn configured_token_must_match() {
        let cfg = Config { admin_token: Some("s3cret".into()), ..Config::default() };
        assert!(is_admin_request(&cfg, &headers(Some("Bearer s3cret"))));
        assert!(!is_admin_request(&cfg, &headers(Some("Bearer wrong"))));
        assert!(!is_admin_request(&cfg, &headers(Some("s3cret"))));
        assert!(!is_admin_request(&cfg, &headers(None)));
    }
}
