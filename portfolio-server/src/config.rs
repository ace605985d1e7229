//! Server configuration, loaded from environment variables at startup.

/// VAPID key material used to sign web-push requests.
///
/// Both keys are base64url encoded (no padding), as produced by the usual
/// `generate-vapid-keys` tooling.
#[derive(Clone)]
pub struct VapidConfig {
    pub public_key: String,
    pub private_key: String,
    /// Contact URI sent as the `sub` claim, e.g. `"mailto:me@example.com"`.
    pub subject: String,
}

impl std::fmt::Debug for VapidConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VapidConfig")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .field("subject", &self.subject)
            .finish()
    }
}

/// Runtime configuration for portfolio-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set. Push delivery stays disabled until
/// a VAPID key pair is provided.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// SQLite database URL (default: `"sqlite://portfolio.db"`).
    pub database_url: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Directory for daily-rotated log files; stdout only when unset.
    pub log_dir: Option<String>,

    /// Bearer token guarding `/admin` and messages sent as the admin.
    /// When unset, admin routes are open (development mode).
    pub admin_token: Option<String>,

    /// Comma-separated CORS origins; any origin when unset.
    pub cors_allowed_origins: Option<String>,

    /// Serve Swagger UI at `/swagger-ui`.
    pub enable_swagger: bool,

    /// VAPID key pair; `None` disables push delivery.
    pub vapid: Option<VapidConfig>,

    /// Delete a stored subscription when the push service reports it gone.
    pub prune_expired_subscriptions: bool,

    /// Svix signing secret (`whsec_…`) for the identity-provider webhook.
    pub identity_webhook_secret: Option<String>,

    /// Capacity of the live conversation broadcast channel.
    pub live_channel_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_owned(),
            database_url: "sqlite://portfolio.db".to_owned(),
            log_level: "info".to_owned(),
            log_json: false,
            log_dir: None,
            admin_token: None,
            cors_allowed_origins: None,
            enable_swagger: true,
            vapid: None,
            prune_expired_subscriptions: true,
            identity_webhook_secret: None,
            live_channel_capacity: 256,
        }
    }
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let vapid = match (
            env_opt("PORTFOLIO_VAPID_PUBLIC_KEY"),
            env_opt("PORTFOLIO_VAPID_PRIVATE_KEY"),
        ) {
            (Some(public_key), Some(private_key)) => Some(VapidConfig {
                public_key,
                private_key,
                subject: env_or("PORTFOLIO_VAPID_SUBJECT", "mailto:admin@example.com"),
            }),
            _ => None,
        };

        Self {
            bind_address: env_or("PORTFOLIO_BIND", &defaults.bind_address),
            database_url: env_or("PORTFOLIO_DATABASE_URL", &defaults.database_url),
            log_level: env_or("PORTFOLIO_LOG", &defaults.log_level),
            log_json: env_bool("PORTFOLIO_LOG_JSON", defaults.log_json),
            log_dir: env_opt("PORTFOLIO_LOG_DIR"),
            admin_token: env_opt("PORTFOLIO_ADMIN_TOKEN"),
            cors_allowed_origins: env_opt("PORTFOLIO_CORS_ORIGINS"),
            enable_swagger: env_bool("PORTFOLIO_ENABLE_SWAGGER", defaults.enable_swagger),
            vapid,
            prune_expired_subscriptions: env_bool(
                "PORTFOLIO_PRUNE_EXPIRED_SUBSCRIPTIONS",
                defaults.prune_expired_subscriptions,
            ),
            identity_webhook_secret: env_opt("PORTFOLIO_IDENTITY_WEBHOOK_SECRET"),
            live_channel_capacity: parse_env(
                "PORTFOLIO_LIVE_CHANNEL_CAPACITY",
                defaults.live_channel_capacity,
            ),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Unset and blank values both count as absent.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_leave_push_disabled() {
        let cfg = Config::default();
        assert!(cfg.vapid.is_none());
        assert!(cfg.admin_token.is_none());
        assert!(cfg.prune_expired_subscriptions);
        assert_eq!(cfg.live_channel_capacity, 256);
    }

    #[test]
    fn vapid_debug_hides_private_key() {
        let vapid = VapidConfig {
            public_key: "pub".into(),
            private_key: "very-secret".into(),
            subject: "mailto:me@example.com".into(),
        };
        let rendered = format!("{vapid:?}");
        assert!(rendered.contains("pub"));
        assert!(!rendered.contains("very-secret"));
    }
}
