//! Web-push delivery.
//!
//! [`PushDelivery`] is the seam between the notifier and the outside world.
//! [`web::WebPushDelivery`] signs and encrypts real pushes; [`DisabledDelivery`]
//! stands in when no VAPID key pair is configured.

pub mod notifier;
pub mod web;

pub use notifier::Notifier;
pub use web::WebPushDelivery;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where a notification click lands when the caller gives no URL.
pub const DEFAULT_CLICK_URL: &str = "/";

/// JSON body the service worker receives: it shows `title`/`body` and opens
/// `url` on click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    pub url: String,
}

impl PushPayload {
    pub fn new(title: impl Into<String>, body: impl Into<String>, url: Option<&str>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            url: url.unwrap_or(DEFAULT_CLICK_URL).to_owned(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PushError {
    #[error("push delivery is disabled (no VAPID keys configured)")]
    Disabled,

    /// The stored subscription is missing the endpoint or keys.
    #[error("invalid push subscription: {0}")]
    InvalidSubscription(#[source] serde_json::Error),

    /// The push service no longer knows this endpoint (HTTP 404/410).
    #[error("push endpoint is gone")]
    Gone,

    #[error("push delivery failed: {0}")]
    Delivery(#[from] web_push::WebPushError),

    #[error("failed to encode push payload: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Sends one payload to one stored browser subscription.
#[async_trait]
pub trait PushDelivery: Send + Sync + 'static {
    async fn deliver(
        &self,
        subscription: &serde_json::Value,
        payload: &PushPayload,
    ) -> Result<(), PushError>;
}

/// Delivery adapter used when push is not configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledDelivery;

#[async_trait]
impl PushDelivery for DisabledDelivery {
    async fn deliver(
        &self,
        _subscription: &serde_json::Value,
        _payload: &PushPayload,
    ) -> Result<(), PushError> {
        Err(PushError::Disabled)
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn payload_url_defaults_to_root() {
        let p = PushPayload::new("hi", "New message", None);
        assert_eq!(
            serde_json::to_value(&p).unwrap(),
            serde_json::json!({ "title": "hi", "body": "New message", "url": "/" })
        );
        assert_eq!(PushPayload::new("a", "b", Some("/chat")).url, "/chat");
    }

    #[tokio::test]
    async fn disabled_delivery_always_fails() {
        let err = DisabledDelivery
            .deliver(&serde_json::json!({}), &PushPayload::new("t", "b", None))
            .await
            .unwrap_err();
        assert!(matches!(err, PushError::Disabled));
    }
}
