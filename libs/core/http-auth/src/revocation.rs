use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// In-memory revocation list for refresh tokens.
///
/// Entries are keyed by `jti` and expire with the token they revoke, so the
/// list stays bounded by the refresh TTL. Semantics mirror a TTL'd key-value
/// store: an expired entry is indistinguishable from an absent one.
#[derive(Clone, Default)]
pub struct RevocationList {
    inner: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
}

impl RevocationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `jti` revoked for `ttl`. Idempotent; re-revoking extends nothing
    /// past the later expiry.
    pub async fn revoke(&self, jti: &str, ttl: Duration) {
        let expires_at = Utc::now() + Self::to_chrono(ttl);
        let mut revoked = self.inner.write().await;
        let entry = revoked.entry(jti.to_string()).or_insert(expires_at);
        if *entry < expires_at {
            *entry = expires_at;
        }
    }

    /// Atomically revoke `jti` unless it already is.
    ///
    /// Returns `true` when this call performed the revocation. Single-use
    /// refresh rotation hinges on this check-and-insert happening under one
    /// write lock: two concurrent refreshes of the same token cannot both win.
    pub async fn revoke_once(&self, jti: &str, ttl: Duration) -> bool {
        let now = Utc::now();
        let mut revoked = self.inner.write().await;
        match revoked.get(jti) {
            Some(expires_at) if *expires_at > now => false,
            _ => {
                revoked.insert(jti.to_string(), now + Self::to_chrono(ttl));
                true
            }
        }
    }

    /// Whether `jti` is currently revoked.
    pub async fn contains(&self, jti: &str) -> bool {
        let revoked = self.inner.read().await;
        revoked.get(jti).is_some_and(|expires_at| *expires_at > Utc::now())
    }

    /// Drop entries whose revocation window has passed. Returns how many.
    pub async fn sweep(&self) -> usize {
        let now = Utc::now();
        let mut revoked = self.inner.write().await;
        let before = revoked.len();
        revoked.retain(|_, expires_at| *expires_at > now);
        before - revoked.len()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    fn to_chrono(ttl: Duration) -> ChronoDuration {
        ChronoDuration::from_std(ttl).unwrap_or_else(|_| ChronoDuration::days(7))
    }
}
