use chrono::{DateTime, Utc};

/// Role given to users whose provider metadata does not name one.
pub const DEFAULT_ROLE: &str = "user";

/// A row in the `users` table, keyed by the identity provider's subject id.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub clerk_user_id: String,
    pub email: String,
    pub name: String,
    /// `"user"` unless the provider says otherwise (e.g. `"admin"`).
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
