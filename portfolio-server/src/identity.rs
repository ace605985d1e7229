//! Identity-provider webhook handling.
//!
//! The provider (Clerk, delivered through Svix) posts `user.*` events. Each
//! `user.created` / `user.updated` becomes an upsert into the local `users`
//! table; everything else is acknowledged and ignored.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

use crate::entities::UserRecord;
use crate::entities::dao::user::DEFAULT_ROLE;

/// Maximum clock skew accepted on `svix-timestamp`.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 5 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing header {0}")]
    MissingHeader(&'static str),
    #[error("webhook secret is not valid base64")]
    InvalidSecret,
    #[error("timestamp is malformed or outside the tolerance window")]
    StaleTimestamp,
    #[error("no matching signature")]
    Mismatch,
}

/// Svix-style verifier for `whsec_…` secrets.
#[derive(Clone)]
pub struct WebhookVerifier {
    key: Vec<u8>,
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WebhookVerifier(<redacted>)")
    }
}

impl WebhookVerifier {
    pub fn new(secret: &str) -> Result<Self, SignatureError> {
        let encoded = secret.strip_prefix("whsec_").unwrap_or(secret);
        let key = STANDARD
            .decode(encoded)
            .map_err(|_| SignatureError::InvalidSecret)?;
        Ok(Self { key })
    }

    fn sign(&self, msg_id: &str, timestamp: &str, body: &[u8]) -> Hmac<Sha256> {
        let mut mac =
            Hmac::<Sha256>::new_from_slice(&self.key).expect("HMAC can take key of any size");
        mac.update(msg_id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(body);
        mac
    }

    /// `signatures` is the raw `svix-signature` header: space-separated
    /// `v1,<base64>` entries, any of which may match.
    pub fn verify(
        &self,
        msg_id: &str,
        timestamp: &str,
        signatures: &str,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<(), SignatureError> {
        let sent_at: i64 = timestamp
            .trim()
            .parse()
            .map_err(|_| SignatureError::StaleTimestamp)?;
        if (now.timestamp() - sent_at).abs() > SIGNATURE_TOLERANCE_SECS {
            return Err(SignatureError::StaleTimestamp);
        }

        let matched = signatures
            .split_whitespace()
            .filter_map(|entry| entry.strip_prefix("v1,"))
            .filter_map(|sig| STANDARD.decode(sig).ok())
            .any(|sig| self.sign(msg_id, timestamp, body).verify_slice(&sig).is_ok());

        if matched { Ok(()) } else { Err(SignatureError::Mismatch) }
    }

    #[cfg(test)]
    pub fn signature_header(&self, msg_id: &str, timestamp: &str, body: &[u8]) -> String {
        let sig = self.sign(msg_id, timestamp, body).finalize().into_bytes();
        format!("v1,{}", STANDARD.encode(sig))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
struct EmailAddress {
    id: Option<String>,
    email_address: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ProviderUser {
    id: String,
    #[serde(default)]
    email_addresses: Vec<EmailAddress>,
    primary_email_address_id: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    username: Option<String>,
    #[serde(default)]
    public_metadata: serde_json::Value,
}

impl IdentityEvent {
    /// Whether this event carries a user that should be upserted.
    pub fn is_user_upsert(&self) -> bool {
        matches!(self.kind.as_str(), "user.created" | "user.updated")
    }

    /// Map the provider's user object onto a local [`UserRecord`].
    pub fn to_user_record(&self, now: DateTime<Utc>) -> Result<UserRecord, serde_json::Error> {
        let user: ProviderUser = serde_json::from_value(self.data.clone())?;

        let email = user
            .primary_email_address_id
            .as_deref()
            .and_then(|primary| {
                user.email_addresses
                    .iter()
                    .find(|e| e.id.as_deref() == Some(primary))
            })
            .or_else(|| user.email_addresses.first())
            .map(|e| e.email_address.clone())
            .unwrap_or_default();

        let full_name = [user.first_name.as_deref(), user.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let name = if !full_name.is_empty() {
            full_name
        } else if let Some(username) = user.username.filter(|u| !u.is_empty()) {
            username
        } else {
            email.clone()
        };

        let role = user
            .public_metadata
            .get("role")
            .and_then(|r| r.as_str())
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_ROLE)
            .to_owned();

        Ok(UserRecord {
            clerk_user_id: user.id,
            email,
            name,
            role,
            created_at: now,
            updated_at: now,
        })
    }
}
