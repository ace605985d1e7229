pub mod chat;
pub mod push;
pub mod user;

pub use chat::{ChatMessage, NewChatMessage, ParticipantSummary};
pub use push::PushSubscriptionRecord;
pub use user::UserRecord;
