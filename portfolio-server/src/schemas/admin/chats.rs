use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::ParticipantSummary;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantResponse {
    pub user_id: String,
    pub message_count: i64,
    /// Epoch milliseconds of the newest message in the conversation.
    pub last_timestamp: i64,
}

impl From<ParticipantSummary> for ParticipantResponse {
    fn from(p: ParticipantSummary) -> Self {
        Self {
            user_id: p.user_id,
            message_count: p.message_count,
            last_timestamp: p.last_timestamp,
        }
    }
}
