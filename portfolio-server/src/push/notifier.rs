//! Best-effort "you have a new message" pushes.
//!
//! Sending a push is independent of storing the message: callers persist the
//! message first and trigger the push as a second call. A failed push is
//! logged and swallowed; the sender never hears about it.

use std::sync::Arc;

use tracing::{Instrument, debug, info, info_span, warn};

use super::{PushDelivery, PushError, PushPayload};
use crate::entities::{PushSubscriptionStore, SqliteStore};

/// What happened to a single notification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The user never registered for push; nothing was sent.
    NoSubscription,
    Delivered,
    /// Delivery failed and the error was discarded.
    Failed,
    /// The push service reported the endpoint gone and it was deleted.
    Pruned,
}

pub struct Notifier {
    store: Arc<SqliteStore>,
    delivery: Arc<dyn PushDelivery>,
    prune_expired: bool,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("prune_expired", &self.prune_expired)
            .finish_non_exhaustive()
    }
}

impl Notifier {
    pub fn new(store: Arc<SqliteStore>, delivery: Arc<dyn PushDelivery>, prune_expired: bool) -> Self {
        Self { store, delivery, prune_expired }
    }

    /// Look up `user_id`'s subscription and push `{title, body, url}` to it.
    ///
    /// Never fails: a missing subscription is a silent no-op and delivery or
    /// store errors are logged.
    pub async fn send_push_to_user(
        &self,
        user_id: &str,
        title: &str,
        body: &str,
        url: Option<&str>,
    ) -> PushOutcome {
        let record = match self.store.get_push_subscription(user_id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!(user_id, "no push subscription; skipping notification");
                return PushOutcome::NoSubscription;
            }
            Err(e) => {
                warn!(user_id, error = %e, "failed to load push subscription");
                return PushOutcome::Failed;
            }
        };

        let payload = PushPayload::new(title, body, url);
        match self.delivery.deliver(&record.subscription, &payload).await {
            Ok(()) => {
                info!(user_id, "push notification delivered");
                PushOutcome::Delivered
            }
            Err(PushError::Gone) if self.prune_expired => {
                match self.store.delete_push_subscription(user_id).await {
                    Ok(_) => {
                        info!(user_id, "push endpoint gone; subscription removed");
                        PushOutcome::Pruned
                    }
                    Err(e) => {
                        warn!(user_id, error = %e, "push endpoint gone but subscription could not be removed");
                        PushOutcome::Failed
                    }
                }
            }
            Err(e) => {
                warn!(user_id, error = %e, "push delivery failed");
                PushOutcome::Failed
            }
        }
    }

    /// Fire-and-forget variant: runs [`Self::send_push_to_user`] on a detached
    /// task and returns immediately.
    pub fn spawn_push_to_user(
        self: &Arc<Self>,
        user_id: String,
        title: String,
        body: String,
        url: Option<String>,
    ) -> tokio::task::JoinHandle<PushOutcome> {
        let notifier = Arc::clone(self);
        let span = info_span!("push_notification", user_id = %user_id);
        tokio::spawn(
            async move {
                notifier
                    .send_push_to_user(&user_id, &title, &body, url.as_deref())
                    .await
            }
            .instrument(span),
        )
    }
}
