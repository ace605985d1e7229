//! Live conversation queries.
//!
//! Every stored message publishes the id of the conversation it belongs to.
//! Subscribers re-run the conversation query when their id comes by and
//! receive the full, freshly ordered snapshot.

use std::sync::Arc;

use futures::{Stream, StreamExt, future};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::{debug, warn};

use crate::entities::{ChatMessage, ChatStore, SqliteStore};

/// Upper bound for the broadcast buffer, whatever the configuration says.
pub const MAX_CHANNEL_CAPACITY: usize = 65_536;

/// Broadcast hub of "conversation with this user changed" events.
#[derive(Debug, Clone)]
pub struct ChatFeed {
    tx: broadcast::Sender<Arc<str>>,
}

impl ChatFeed {
    /// `capacity` is clamped to `1..=MAX_CHANNEL_CAPACITY`; tokio rejects
    /// zero and anything above `usize::MAX / 2`.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.clamp(1, MAX_CHANNEL_CAPACITY));
        Self { tx }
    }

    /// Announce a change to the conversation with `user_id`. Having no
    /// subscribers is normal.
    pub fn publish(&self, user_id: &str) {
        let receivers = self.tx.send(Arc::from(user_id)).unwrap_or(0);
        debug!(user_id, receivers, "conversation change published");
    }

    /// Stream of conversation snapshots for `user_id`: one immediately, then
    /// one after every change. Missed events (slow consumer) collapse into a
    /// single re-evaluation.
    pub fn watch(
        &self,
        store: Arc<SqliteStore>,
        user_id: String,
    ) -> impl Stream<Item = Result<Vec<ChatMessage>, sqlx::Error>> + Send + 'static + use<> {
        let changes = BroadcastStream::new(self.tx.subscribe());
        let key: Arc<str> = Arc::from(user_id.as_str());

        let triggers = futures::stream::once(future::ready(())).chain(changes.filter_map(
            move |event| {
                let trigger = match event {
                    Ok(changed) => (changed == key).then_some(()),
                    Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                        warn!(skipped, "live conversation subscriber lagged; re-evaluating");
                        Some(())
                    }
                };
                future::ready(trigger)
            },
        ));

        triggers.then(move |()| {
            let store = Arc::clone(&store);
            let user_id = user_id.clone();
            async move { store.conversation(&user_id).await }
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::entities::{NewChatMessage, Participant};
    use std::time::Duration;

    async fn send(store: &SqliteStore, feed: &ChatFeed, from: &str, to: &str, body: &str) {
        let msg = store
            .append_message(NewChatMessage {
                from: Participant::from(from),
                to: Participant::from(to),
                message: body.into(),
                from_name: "n".into(),
                from_image: None,
            })
            .await
            .unwrap();
        let key = crate::entities::participant::conversation_key(&msg.from, &msg.to).unwrap();
        feed.publish(key);
    }

    #[tokio::test]
    async fn watch_emits_initial_snapshot_then_updates() {
        let store = Arc::new(SqliteStore::in_memory().await);
        let feed = ChatFeed::new(16);
        send(&store, &feed, "u1", "admin", "before").await;

        let stream = feed.watch(store.clone(), "u1".into());
        tokio::pin!(stream);

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.len(), 1);

        send(&store, &feed, "u2", "admin", "other conversation").await;
        send(&store, &feed, "admin", "u1", "after").await;

        let second = tokio::time::timeout(Duration::from_secs(2), stream.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let bodies: Vec<&str> = second.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(bodies, vec!["before", "after"]);
    }

    #[test]
    fn publish_without_subscribers_is_fine() {
        ChatFeed::new(4).publish("nobody");
    }

    #[tokio::test]
    async fn out_of_range_capacity_is_clamped() {
        let huge = ChatFeed::new(usize::MAX);
        let mut rx = huge.tx.subscribe();
        huge.publish("u1");
        assert_eq!(&*rx.recv().await.unwrap(), "u1");

        let zero = ChatFeed::new(0);
        let mut rx = zero.tx.subscribe();
        zero.publish("u2");
        assert_eq!(&*rx.recv().await.unwrap(), "u2");
    }
}
