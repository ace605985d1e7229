pub mod chats;
pub mod users;
