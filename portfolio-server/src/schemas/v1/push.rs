use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::PushSubscriptionRecord;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscriptionResponse {
    pub user_id: String,
    /// The subscription exactly as the browser produced it.
    #[schema(value_type = Object)]
    pub subscription: serde_json::Value,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for `POST /v1/push/notify`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotifyRequest {
    pub user_id: String,
    pub title: String,
    pub body: String,
    /// Page opened on click; `/` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VapidPublicKeyResponse {
    /// `None` when push delivery is disabled.
    pub public_key: Option<String>,
}

impl PushSubscriptionRecord {
    pub fn to_response(&self) -> PushSubscriptionResponse {
        PushSubscriptionResponse {
            user_id: self.user_id.clone(),
            subscription: self.subscription.clone(),
            created_at: self.created_at.to_rfc3339(),
            updated_at: self.updated_at.to_rfc3339(),
        }
    }
}
