//! Persistence layer.
//!
//! Each record kind has its own store trait ([`ChatStore`],
//! [`PushSubscriptionStore`], [`UserStore`]); [`SqliteStore`] implements all
//! of them. Handlers only talk to the traits, so swapping SQLite for another
//! sqlx backend means one new `impl` block per trait.
//!
//! All trait methods use `impl Future` in their signatures, so no
//! `async-trait` boxing is involved on the hot path.

pub mod chat;
pub mod dao;
pub mod participant;
pub mod push;
pub mod user;

pub use dao::{ChatMessage, NewChatMessage, ParticipantSummary, PushSubscriptionRecord, UserRecord};

pub use chat::ChatStore;
pub use participant::{ADMIN_ID, Participant};
pub use push::PushSubscriptionStore;
pub use user::UserStore;

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

/// SQLite-backed store for messages, push subscriptions and users.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the SQLite database at `url` and run pending migrations.
    ///
    /// `url` should be a sqlx-compatible SQLite URL, e.g. `"sqlite://portfolio.db"`
    /// or `"sqlite::memory:"` for tests.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // Every connection to `:memory:` is a separate database, so pin the
        // pool to one connection that never gets recycled.
        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new().connect_with(options).await?
        };

        // Path is resolved relative to CARGO_MANIFEST_DIR at compile time.
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// Round-trip a trivial query to prove the pool can still reach the file.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Fresh, migrated in-memory store.
    #[cfg(test)]
    pub async fn in_memory() -> Self {
        Self::connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite should open")
    }
}

/// Parses an RFC 3339 column, falling back to "now" on corrupt data.
pub(crate) fn parse_timestamp(raw: &str, column: &'static str) -> DateTime<Utc> {
    raw.parse().unwrap_or_else(|e: chrono::ParseError| {
        tracing::warn!(raw = %raw, column, error = %e, "failed to parse timestamp; using now");
        Utc::now()
    })
}
