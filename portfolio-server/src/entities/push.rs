use std::future::Future;

use crate::entities::{PushSubscriptionRecord, SqliteStore, parse_timestamp};

pub trait PushSubscriptionStore: Send + Sync + 'static {
    /// Insert or replace the subscription for `user_id` (last write wins).
    fn save_push_subscription(
        &self,
        user_id: &str,
        subscription: &serde_json::Value,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;

    /// `Ok(None)` when the user never registered; that is not an error.
    fn get_push_subscription(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<PushSubscriptionRecord>, sqlx::Error>> + Send;

    /// Returns `true` if a row was removed.
    fn delete_push_subscription(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;
}

impl PushSubscriptionStore for SqliteStore {
    async fn save_push_subscription(
        &self,
        user_id: &str,
        subscription: &serde_json::Value,
    ) -> Result<(), sqlx::Error> {
        let now = chrono::Utc::now().to_rfc3339();
        let payload = subscription.to_string();
        sqlx::query(
            "INSERT INTO push_subscriptions (user_id, subscription, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?3) \
             ON CONFLICT(user_id) DO UPDATE SET subscription = ?2, updated_at = ?3",
        )
        .bind(user_id)
        .bind(&payload)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_push_subscription(
        &self,
        user_id: &str,
    ) -> Result<Option<PushSubscriptionRecord>, sqlx::Error> {
        let row: Option<(String, String, String, String)> = sqlx::query_as(
            "SELECT user_id, subscription, created_at, updated_at \
             FROM push_subscriptions WHERE user_id = ?1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(user_id, subscription, created_at, updated_at)| {
            let subscription = serde_json::from_str(&subscription)
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
            Ok(PushSubscriptionRecord {
                user_id,
                subscription,
                created_at: parse_timestamp(&created_at, "push_subscriptions.created_at"),
                updated_at: parse_timestamp(&updated_at, "push_subscriptions.updated_at"),
            })
        })
        .transpose()
    }

    async fn delete_push_subscription(&self, user_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM push_subscriptions WHERE user_id = ?1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn subscription(endpoint: &str) -> serde_json::Value {
        json!({
            "endpoint": endpoint,
            "expirationTime": null,
            "keys": { "p256dh": "BNcRd", "auth": "tBHI" }
        })
    }

    async fn count_rows(store: &SqliteStore, user_id: &str) -> i64 {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM push_subscriptions WHERE user_id = ?1")
            .bind(user_id)
            .fetch_one(&store.pool)
            .await
            .unwrap();
        n
    }

    #[tokio::test]
    async fn missing_subscription_is_none() {
        let store = SqliteStore::in_memory().await;
        assert!(store.get_push_subscription("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn second_save_replaces_first() {
        let store = SqliteStore::in_memory().await;
        let s1 = subscription("https://push.example/one");
        let s2 = subscription("https://push.example/two");

        store.save_push_subscription("u1", &s1).await.unwrap();
        store.save_push_subscription("u1", &s2).await.unwrap();

        assert_eq!(count_rows(&store, "u1").await, 1);
        let stored = store.get_push_subscription("u1").await.unwrap().unwrap();
        assert_eq!(stored.subscription, s2);
        assert!(stored.updated_at >= stored.created_at);
    }

    #[tokio::test]
    async fn subscriptions_are_per_user() {
        let store = SqliteStore::in_memory().await;
        store.save_push_subscription("u1", &subscription("a")).await.unwrap();
        store.save_push_subscription("u2", &subscription("b")).await.unwrap();

        let u1 = store.get_push_subscription("u1").await.unwrap().unwrap();
        assert_eq!(u1.subscription["endpoint"], "a");
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_existed() {
        let store = SqliteStore::in_memory().await;
        store.save_push_subscription("u1", &subscription("a")).await.unwrap();
        assert!(store.delete_push_subscription("u1").await.unwrap());
        assert!(!store.delete_push_subscription("u1").await.unwrap());
        assert!(store.get_push_subscription("u1").await.unwrap().is_none());
    }
}
