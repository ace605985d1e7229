//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::config::Config;
use crate::entities::SqliteStore;
use crate::identity::WebhookVerifier;
use crate::live::ChatFeed;
use crate::push::Notifier;

/// State shared across all HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Messages, push subscriptions and users.
    pub store: Arc<SqliteStore>,
    /// Best-effort push notifications.
    pub notifier: Arc<Notifier>,
    /// Change feed behind the live conversation endpoint.
    pub feed: ChatFeed,
    /// `None` when no webhook secret is configured.
    pub webhook_verifier: Option<WebhookVerifier>,
}
