//! [`PushDelivery`] over the Web Push protocol (RFC 8030 + VAPID, RFC 8292).

use async_trait::async_trait;
use tracing::debug;
use web_push::{
    ContentEncoding, IsahcWebPushClient, SubscriptionInfo, VapidSignatureBuilder, WebPushClient,
    WebPushError, WebPushMessageBuilder,
};

use super::{PushDelivery, PushError, PushPayload};
use crate::config::VapidConfig;

/// Signs with the process-wide VAPID key pair handed over at start-up and
/// sends through a shared HTTP client.
pub struct WebPushDelivery {
    vapid: VapidConfig,
    client: IsahcWebPushClient,
}

impl std::fmt::Debug for WebPushDelivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebPushDelivery")
            .field("vapid", &self.vapid)
            .finish_non_exhaustive()
    }
}

impl WebPushDelivery {
    pub fn new(vapid: VapidConfig) -> Result<Self, PushError> {
        let client = IsahcWebPushClient::new()?;
        Ok(Self { vapid, client })
    }
}

/// Reads the endpoint and `p256dh`/`auth` keys out of the opaque stored value.
fn subscription_info(subscription: &serde_json::Value) -> Result<SubscriptionInfo, PushError> {
    serde_json::from_value(subscription.clone()).map_err(PushError::InvalidSubscription)
}

#[async_trait]
impl PushDelivery for WebPushDelivery {
    async fn deliver(
        &self,
        subscription: &serde_json::Value,
        payload: &PushPayload,
    ) -> Result<(), PushError> {
        let info = subscription_info(subscription)?;
        let content = serde_json::to_vec(payload).map_err(PushError::Encode)?;

        let mut signature = VapidSignatureBuilder::from_base64(&self.vapid.private_key, web_push::URL_SAFE_NO_PAD, &info)?;
        signature.add_claim("sub", self.vapid.subject.as_str());
        let signature = signature.build()?;

        let mut builder = WebPushMessageBuilder::new(&info);
        builder.set_payload(ContentEncoding::Aes128Gcm, &content);
        builder.set_vapid_signature(signature);
        let message = builder.build()?;

        debug!(endpoint = %info.endpoint, bytes = content.len(), "sending web push");
        self.client.send(message).await.map_err(|e| match e {
            WebPushError::EndpointNotValid { .. } | WebPushError::EndpointNotFound { .. } => {
                PushError::Gone
            }
            other => PushError::Delivery(other),
        })
    }
}
