//! Per-request trace id and access logging.
//!
//! The `x-trace-id` header is reused when it holds a UUID, generated
//! otherwise, and echoed back on the response.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::state::AppState;

pub static X_TRACE_ID: &str = "x-trace-id";

pub async fn trace_middleware(
    State(_state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let start_time = Instant::now();

    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        info!("→ request started");

        // A hyphenated UUID is always a valid header value.
        let header_value = HeaderValue::from_str(&trace_id.to_string()).ok();
        if let Some(v) = &header_value {
            req.headers_mut().insert(X_TRACE_ID, v.clone());
        }

        let mut response = next.run(req).await;

        if let Some(v) = header_value {
            response.headers_mut().insert(X_TRACE_ID, v);
        }

        info!(
            status = response.status().as_u16(),
            latency_ms = start_time.elapsed().as_millis(),
            "← response finished"
        );
        response
    }
    .instrument(span)
    .await
}
