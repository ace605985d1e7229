//! portfolio-server – entry point.
//!
//! Startup order:
//! 1. Parse configuration from environment variables.
//! 2. Initialise structured tracing (JSON in production, pretty in dev).
//! 3. Open the SQLite database and run pending migrations.
//! 4. Pick the push delivery adapter (web push when VAPID keys are set).
//! 5. Build the Axum router and start the HTTP server with graceful shutdown.

mod config;
mod entities;
mod error;
mod identity;
mod live;
mod middleware;
mod push;
mod routes;
mod schemas;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::config::Config;
use crate::entities::SqliteStore;
use crate::identity::WebhookVerifier;
use crate::live::ChatFeed;
use crate::push::{DisabledDelivery, Notifier, PushDelivery, WebPushDelivery};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Configuration ───────────────────────────────────────────────────────
    let cfg = Config::from_env();

    // ── 2. Tracing ─────────────────────────────────────────────────────────────
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match cfg.log_level.parse::<tracing_subscriber::EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: PORTFOLIO_LOG='{}' is not a valid tracing filter ({}); \
                     falling back to 'info'",
                    cfg.log_level, e
                );
                tracing_subscriber::EnvFilter::new("info")
            }
        },
    };

    // The guard flushes the file writer on drop; keep it alive until exit.
    let (writer, _log_guard) = match &cfg.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "portfolio-server.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stdout), None),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_target(true)
        .with_thread_ids(true);

    if cfg.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!(version = env!("CARGO_PKG_VERSION"), "portfolio-server starting");

    // ── 3. Database ────────────────────────────────────────────────────────────
    let store = Arc::new(SqliteStore::connect(&cfg.database_url).await?);
    info!(database_url = %cfg.database_url, "database ready");

    // ── 4. Push delivery ───────────────────────────────────────────────────────
    let delivery: Arc<dyn PushDelivery> = match cfg.vapid.clone() {
        Some(vapid) => {
            let delivery = WebPushDelivery::new(vapid).context("failed to create web push client")?;
            info!("web push enabled");
            Arc::new(delivery)
        }
        None => {
            warn!("PORTFOLIO_VAPID_* not set; push notifications are disabled");
            Arc::new(DisabledDelivery)
        }
    };
    let notifier = Arc::new(Notifier::new(
        Arc::clone(&store),
        delivery,
        cfg.prune_expired_subscriptions,
    ));

    let webhook_verifier = cfg
        .identity_webhook_secret
        .as_deref()
        .map(WebhookVerifier::new)
        .transpose()
        .context("PORTFOLIO_IDENTITY_WEBHOOK_SECRET is invalid")?;
    if webhook_verifier.is_none() {
        warn!("PORTFOLIO_IDENTITY_WEBHOOK_SECRET not set; identity webhooks are accepted unsigned");
    }
    if cfg.admin_token.is_none() {
        warn!("PORTFOLIO_ADMIN_TOKEN not set; admin routes and admin-sent messages are open");
    }

    // ── 5. Shared application state ────────────────────────────────────────────
    let state = Arc::new(AppState {
        feed: ChatFeed::new(cfg.live_channel_capacity),
        config: Arc::new(cfg.clone()),
        store,
        notifier,
        webhook_verifier,
    });

    // ── 6. HTTP server with graceful shutdown ──────────────────────────────────
    let app = routes::build(Arc::clone(&state));
    let addr: SocketAddr = cfg.bind_address.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("portfolio-server stopped");
    Ok(())
}

/// Returns a future that resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received; starting graceful shutdown");
}
