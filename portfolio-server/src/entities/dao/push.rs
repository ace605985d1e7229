use chrono::{DateTime, Utc};

/// A row in the `push_subscriptions` table; at most one per user.
#[derive(Debug, Clone)]
pub struct PushSubscriptionRecord {
    pub user_id: String,
    /// Browser `PushSubscription.toJSON()` output, kept opaque.
    pub subscription: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
