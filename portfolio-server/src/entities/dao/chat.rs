use crate::entities::Participant;

/// A single row in the `chat_messages` table. Never updated once written.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub from: Participant,
    pub to: Participant,
    pub message: String,
    /// Sender display name at send time.
    pub from_name: String,
    /// Sender avatar URL at send time, if the client supplied one.
    pub from_image: Option<String>,
    /// Server-assigned creation time in epoch milliseconds.
    pub timestamp: i64,
}

/// Input of [`crate::entities::ChatStore::append_message`]; id and timestamp
/// are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewChatMessage {
    pub from: Participant,
    pub to: Participant,
    pub message: String,
    pub from_name: String,
    pub from_image: Option<String>,
}

/// One visitor as seen from the admin inbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantSummary {
    pub user_id: String,
    pub message_count: i64,
    pub last_timestamp: i64,
}
