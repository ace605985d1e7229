use std::future::Future;

use chrono::Utc;
use uuid::Uuid;

use crate::entities::{ADMIN_ID, ChatMessage, NewChatMessage, Participant, ParticipantSummary, SqliteStore};

pub trait ChatStore: Send + Sync + 'static {
    /// Insert one message with a fresh id and server timestamp. Duplicate
    /// sends are stored twice.
    fn append_message(
        &self,
        msg: NewChatMessage,
    ) -> impl Future<Output = Result<ChatMessage, sqlx::Error>> + Send;

    /// Every message between the admin and `user_id`, oldest first.
    fn conversation(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<ChatMessage>, sqlx::Error>> + Send;

    /// Every stored message, oldest first.
    fn list_all_messages(&self) -> impl Future<Output = Result<Vec<ChatMessage>, sqlx::Error>> + Send;

    /// Users who have a conversation with the admin, most recent first.
    fn list_participants(
        &self,
    ) -> impl Future<Output = Result<Vec<ParticipantSummary>, sqlx::Error>> + Send;
}

type MessageRow = (String, String, String, String, String, Option<String>, i64);

fn from_row(
    (id, from_id, to_id, message, from_name, from_image, timestamp): MessageRow,
) -> ChatMessage {
    ChatMessage {
        id,
        from: Participant::from(from_id),
        to: Participant::from(to_id),
        message,
        from_name,
        from_image,
        timestamp,
    }
}

impl ChatStore for SqliteStore {
    async fn append_message(&self, msg: NewChatMessage) -> Result<ChatMessage, sqlx::Error> {
        let stored = ChatMessage {
            id: Uuid::new_v4().to_string(),
            from: msg.from,
            to: msg.to,
            message: msg.message,
            from_name: msg.from_name,
            from_image: msg.from_image,
            timestamp: Utc::now().timestamp_millis(),
        };
        sqlx::query(
            "INSERT INTO chat_messages (id, from_id, to_id, message, from_name, from_image, timestamp) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&stored.id)
        .bind(stored.from.as_str())
        .bind(stored.to.as_str())
        .bind(&stored.message)
        .bind(&stored.from_name)
        .bind(&stored.from_image)
        .bind(stored.timestamp)
        .execute(&self.pool)
        .await?;
        Ok(stored)
    }

    async fn conversation(&self, user_id: &str) -> Result<Vec<ChatMessage>, sqlx::Error> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT id, from_id, to_id, message, from_name, from_image, timestamp \
             FROM chat_messages \
             WHERE (from_id = ?1 AND to_id = ?2) OR (from_id = ?2 AND to_id = ?1) \
             ORDER BY timestamp ASC, rowid ASC",
        )
        .bind(ADMIN_ID)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(from_row).collect())
    }

    async fn list_all_messages(&self) -> Result<Vec<ChatMessage>, sqlx::Error> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT id, from_id, to_id, message, from_name, from_image, timestamp \
             FROM chat_messages ORDER BY timestamp ASC, rowid ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(from_row).collect())
    }

    async fn list_participants(&self) -> Result<Vec<ParticipantSummary>, sqlx::Error> {
        let rows: Vec<(String, i64, i64)> = sqlx::query_as(
            "SELECT CASE WHEN from_id = ?1 THEN to_id ELSE from_id END AS user_id, \
                    COUNT(*) AS message_count, \
                    MAX(timestamp) AS last_timestamp \
             FROM chat_messages \
             WHERE (from_id = ?1) <> (to_id = ?1) \
             GROUP BY user_id \
             ORDER BY last_timestamp DESC",
        )
        .bind(ADMIN_ID)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(user_id, message_count, last_timestamp)| ParticipantSummary {
                user_id,
                message_count,
                last_timestamp,
            })
            .collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::entities::participant::conversation_key;

    fn msg(from: &str, to: &str, body: &str) -> NewChatMessage {
        NewChatMessage {
            from: Participant::from(from),
            to: Participant::from(to),
            message: body.into(),
            from_name: format!("{from} name"),
            from_image: None,
        }
    }

    #[tokio::test]
    async fn conversation_contains_both_directions_only() {
        let store = SqliteStore::in_memory().await;
        store.append_message(msg("admin", "u1", "hello u1")).await.unwrap();
        store.append_message(msg("u1", "admin", "hi admin")).await.unwrap();
        store.append_message(msg("admin", "u2", "hello u2")).await.unwrap();
        store.append_message(msg("u2", "admin", "from u2")).await.unwrap();

        let chat = store.conversation("u1").await.unwrap();
        let bodies: Vec<&str> = chat.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(bodies, vec!["hello u1", "hi admin"]);
        assert!(
            chat.iter()
                .all(|m| conversation_key(&m.from, &m.to) == Some("u1"))
        );
    }

    #[tokio::test]
    async fn conversation_is_chronological_in_insertion_order() {
        let store = SqliteStore::in_memory().await;
        for i in 0..20 {
            let (from, to) = if i % 2 == 0 { ("admin", "u1") } else { ("u1", "admin") };
            store.append_message(msg(from, to, &i.to_string())).await.unwrap();
        }

        let chat = store.conversation("u1").await.unwrap();
        assert_eq!(chat.len(), 20);
        assert!(chat.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        let order: Vec<String> = chat.iter().map(|m| m.message.clone()).collect();
        let expected: Vec<String> = (0..20).map(|i| i.to_string()).collect();
        assert_eq!(order, expected);
    }

    #[tokio::test]
    async fn absent_image_round_trips_as_none() {
        let store = SqliteStore::in_memory().await;
        store.append_message(msg("u7", "admin", "")).await.unwrap();
        let with_image = NewChatMessage {
            from_image: Some("https://img.example/a.png".into()),
            ..msg("admin", "u7", "reply")
        };
        store.append_message(with_image).await.unwrap();

        let chat = store.conversation("u7").await.unwrap();
        assert_eq!(chat[0].from_image, None);
        assert_eq!(chat[0].message, "");
        assert_eq!(chat[1].from_image.as_deref(), Some("https://img.example/a.png"));
    }

    #[tokio::test]
    async fn duplicate_sends_are_kept() {
        let store = SqliteStore::in_memory().await;
        let a = store.append_message(msg("u1", "admin", "same")).await.unwrap();
        let b = store.append_message(msg("u1", "admin", "same")).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.conversation("u1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn list_all_and_participants() {
        let store = SqliteStore::in_memory().await;
        store.append_message(msg("u1", "admin", "a")).await.unwrap();
        store.append_message(msg("admin", "u1", "b")).await.unwrap();
        store.append_message(msg("u2", "admin", "c")).await.unwrap();

        assert_eq!(store.list_all_messages().await.unwrap().len(), 3);

        let participants = store.list_participants().await.unwrap();
        assert_eq!(participants.len(), 2);
        let u1 = participants.iter().find(|p| p.user_id == "u1").unwrap();
        assert_eq!(u1.message_count, 2);
        let u2 = participants.iter().find(|p| p.user_id == "u2").unwrap();
        assert_eq!(u2.message_count, 1);
        assert!(participants[0].last_timestamp >= participants[1].last_timestamp);
    }
}
