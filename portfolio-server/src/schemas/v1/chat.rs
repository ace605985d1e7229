//! Chat request / response types. Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::ChatMessage;

/// Request body for `POST /v1/chat/messages`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    /// Sender: `"admin"` or a user id.
    pub from: String,
    /// Recipient: `"admin"` or a user id.
    pub to: String,
    pub message: String,
    pub from_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_image: Option<String>,
}

/// A stored chat message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub from: String,
    pub to: String,
    pub message: String,
    pub from_name: String,
    /// Omitted when the sender supplied no avatar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_image: Option<String>,
    /// Server-assigned creation time, epoch milliseconds.
    pub timestamp: i64,
}

impl ChatMessage {
    pub fn to_response(&self) -> MessageResponse {
        MessageResponse {
            id: self.id.clone(),
            from: self.from.to_string(),
            to: self.to.to_string(),
            message: self.message.clone(),
            from_name: self.from_name.clone(),
            from_image: self.from_image.clone(),
            timestamp: self.timestamp,
        }
    }
}
