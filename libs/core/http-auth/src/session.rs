use base64::Engine;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::RngCore;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::{AuthError, AuthResult};

/// Opaque session identifier handed to the client.
///
/// 32 random bytes, base64url without padding. Collision probability over the
/// store lifetime is negligible, and identifiers are never reissued.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    fn generate() -> Self {
        let mut buf = [0u8; 32];
        rand::rng().fill_bytes(&mut buf);
        Self(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct SessionRecord {
    user_id: Uuid,
    payload: HashMap<String, Value>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// Read-only view of a live session
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub user_id: Uuid,
    pub payload: HashMap<String, Value>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<&SessionRecord> for SessionSnapshot {
    fn from(record: &SessionRecord) -> Self {
        Self {
            user_id: record.user_id,
            payload: record.payload.clone(),
            created_at: record.created_at,
            expires_at: record.expires_at,
        }
    }
}

/// In-memory session store.
///
/// Each operation takes the lock once and works on a single map entry, so
/// updates to one identifier never interleave partially with another. Expired
/// records are dropped lazily on access and in bulk by [`SessionStore::sweep`].
#[derive(Clone)]
pub struct SessionStore {
    ttl: ChronoDuration,
    sliding: bool,
    inner: Arc<RwLock<HashMap<SessionId, SessionRecord>>>,
}

impl SessionStore {
    pub fn new(ttl: Duration, sliding: bool) -> Self {
        Self {
            ttl: ChronoDuration::from_std(ttl).unwrap_or_else(|_| ChronoDuration::days(1)),
            sliding,
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn sliding(&self) -> bool {
        self.sliding
    }

    /// Create a session for `user_id` with an initial payload.
    pub async fn create(&self, user_id: Uuid, payload: HashMap<String, Value>) -> SessionId {
        let now = Utc::now();
        let id = SessionId::generate();
        let record = SessionRecord {
            user_id,
            payload,
            created_at: now,
            expires_at: now + self.ttl,
        };

        let mut sessions = self.inner.write().await;
        sessions.insert(id.clone(), record);

        tracing::debug!(user_id = %user_id, session_id = %id, "Created session");
        id
    }

    /// Resolve a session. Expired records are removed and reported as
    /// [`AuthError::SessionExpired`]; unknown identifiers as
    /// [`AuthError::SessionNotFound`]. Callers treat both as "no session".
    pub async fn get(&self, id: &SessionId) -> AuthResult<SessionSnapshot> {
        // Fast path under the read lock; live lookups never serialize.
        {
            let sessions = self.inner.read().await;
            match sessions.get(id) {
                Some(record) if record.expires_at > Utc::now() => return Ok(record.into()),
                Some(_) => {}
                None => return Err(AuthError::SessionNotFound),
            }
        }

        // Expired: upgrade to the write lock to drop the record, re-checking
        // since a sweep or touch may have raced the upgrade.
        let mut sessions = self.inner.write().await;
        match sessions.get(id) {
            Some(record) if record.expires_at > Utc::now() => Ok(record.into()),
            Some(_) => {
                sessions.remove(id);
                tracing::debug!(session_id = %id, "Dropped expired session on access");
                Err(AuthError::SessionExpired)
            }
            None => Err(AuthError::SessionNotFound),
        }
    }

    /// Set one payload key.
    pub async fn set(&self, id: &SessionId, key: &str, value: Value) -> AuthResult<()> {
        self.with_live_record(id, |record| {
            record.payload.insert(key.to_string(), value);
        })
        .await
    }

    /// Delete one payload key. Missing keys are not an error.
    pub async fn delete(&self, id: &SessionId, key: &str) -> AuthResult<()> {
        self.with_live_record(id, |record| {
            record.payload.remove(key);
        })
        .await
    }

    /// Empty the payload. The identifier and expiry survive; only `flush`
    /// destroys the record.
    pub async fn clear(&self, id: &SessionId) -> AuthResult<()> {
        self.with_live_record(id, |record| {
            record.payload.clear();
        })
        .await
    }

    /// Extend expiry from now. No-op unless sliding expiry is enabled.
    pub async fn touch(&self, id: &SessionId) -> AuthResult<()> {
        if !self.sliding {
            return Ok(());
        }
        let ttl = self.ttl;
        self.with_live_record(id, |record| {
            record.expires_at = Utc::now() + ttl;
        })
        .await
    }

    /// Destroy the record entirely. Idempotent: flushing an absent identifier
    /// is not an error.
    pub async fn flush(&self, id: &SessionId) {
        let mut sessions = self.inner.write().await;
        if sessions.remove(id).is_some() {
            tracing::debug!(session_id = %id, "Flushed session");
        }
    }

    /// Remove every expired record. Returns how many were dropped.
    ///
    /// Expired identifiers are collected under a read lock first so the write
    /// lock is held only for the removals themselves.
    pub async fn sweep(&self) -> usize {
        let now = Utc::now();
        let expired: Vec<SessionId> = {
            let sessions = self.inner.read().await;
            sessions
                .iter()
                .filter(|(_, record)| record.expires_at <= now)
                .map(|(id, _)| id.clone())
                .collect()
        };

        if expired.is_empty() {
            return 0;
        }

        let mut sessions = self.inner.write().await;
        let mut removed = 0;
        for id in expired {
            // Re-check under the write lock; a touch may have raced the scan.
            if sessions
                .get(&id)
                .is_some_and(|record| record.expires_at <= now)
            {
                sessions.remove(&id);
                removed += 1;
            }
        }

        if removed > 0 {
            tracing::debug!(removed, "Swept expired sessions");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Take and hold the store's write lock, blocking every lookup until the
    /// returned guard drops. Test hook for simulating a stalled store.
    #[cfg(test)]
    pub(crate) async fn stall(&self) -> impl Sized + '_ {
        self.inner.write().await
    }

    async fn with_live_record<F>(&self, id: &SessionId, mutate: F) -> AuthResult<()>
    where
        F: FnOnce(&mut SessionRecord),
    {
        let mut sessions = self.inner.write().await;
        match sessions.get_mut(id) {
            Some(record) if record.expires_at > Utc::now() => {
                mutate(record);
                Ok(())
            }
            Some(_) => {
                sessions.remove(id);
                Err(AuthError::SessionExpired)
            }
            None => Err(AuthError::SessionNotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store_with_ttl(ttl_ms: u64) -> SessionStore {
        SessionStore::new(Duration::from_millis(ttl_ms), false)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = store_with_ttl(60_000);
        let user_id = Uuid::new_v4();
        let mut payload = HashMap::new();
        payload.insert("username".to_string(), json!("maria"));

        let id = store.create(user_id, payload).await;
        let snapshot = store.get(&id).await.unwrap();
        assert_eq!(snapshot.user_id, user_id);
        assert_eq!(snapshot.payload["username"], json!("maria"));
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let store = store_with_ttl(60_000);
        let result = store.get(&SessionId::from("no-such-session")).await;
        assert!(matches!(result, Err(AuthError::SessionNotFound)));
    }

    #[tokio::test]
    async fn test_expiry_window() {
        let store = store_with_ttl(30);
        let id = store.create(Uuid::new_v4(), HashMap::new()).await;

        assert!(store.get(&id).await.is_ok());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(matches!(store.get(&id).await, Err(AuthError::SessionExpired)));
        // The lazy drop means a second lookup no longer finds anything.
        assert!(matches!(store.get(&id).await, Err(AuthError::SessionNotFound)));
    }

    #[tokio::test]
    async fn test_payload_set_delete_clear() {
        let store = store_with_ttl(60_000);
        let id = store.create(Uuid::new_v4(), HashMap::new()).await;

        store.set(&id, "cart", json!(["a", "b"])).await.unwrap();
        store.set(&id, "theme", json!("dark")).await.unwrap();
        store.delete(&id, "cart").await.unwrap();

        let snapshot = store.get(&id).await.unwrap();
        assert!(!snapshot.payload.contains_key("cart"));
        assert_eq!(snapshot.payload["theme"], json!("dark"));

        store.clear(&id).await.unwrap();
        // clear keeps the session alive with an empty payload
        let snapshot = store.get(&id).await.unwrap();
        assert!(snapshot.payload.is_empty());
    }

    #[tokio::test]
    async fn test_flush_is_idempotent() {
        let store = store_with_ttl(60_000);
        let id = store.create(Uuid::new_v4(), HashMap::new()).await;

        store.flush(&id).await;
        assert!(matches!(store.get(&id).await, Err(AuthError::SessionNotFound)));
        // Second flush of the same id is a no-op, not an error.
        store.flush(&id).await;
    }

    #[tokio::test]
    async fn test_touch_extends_only_when_sliding() {
        let sliding = SessionStore::new(Duration::from_millis(80), true);
        let id = sliding.create(Uuid::new_v4(), HashMap::new()).await;

        let before = sliding.get(&id).await.unwrap().expires_at;
        tokio::time::sleep(Duration::from_millis(20)).await;
        sliding.touch(&id).await.unwrap();
        let after = sliding.get(&id).await.unwrap().expires_at;
        assert!(after > before);

        let fixed = SessionStore::new(Duration::from_millis(80), false);
        let id = fixed.create(Uuid::new_v4(), HashMap::new()).await;
        let before = fixed.get(&id).await.unwrap().expires_at;
        fixed.touch(&id).await.unwrap();
        let after = fixed.get(&id).await.unwrap().expires_at;
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired() {
        let store = store_with_ttl(30);
        let expired = store.create(Uuid::new_v4(), HashMap::new()).await;
        tokio::time::sleep(Duration::from_millis(60)).await;

        let live_store = store.clone();
        let live = live_store.create(Uuid::new_v4(), HashMap::new()).await;

        let removed = store.sweep().await;
        assert_eq!(removed, 1);
        assert!(matches!(store.get(&expired).await, Err(AuthError::SessionNotFound)));
        assert!(store.get(&live).await.is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_creates_are_unique() {
        let store = store_with_ttl(60_000);
        let mut handles = Vec::new();
        for _ in 0..64 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.create(Uuid::new_v4(), HashMap::new()).await
            }));
        }

        let mut ids = std::collections::HashSet::new();
        for handle in handles {
            assert!(ids.insert(handle.await.unwrap()));
        }
        assert_eq!(store.len().await, 64);
    }

    #[tokio::test]
    async fn test_concurrent_mutations_on_distinct_ids() {
        let store = store_with_ttl(60_000);
        let a = store.create(Uuid::new_v4(), HashMap::new()).await;
        let b = store.create(Uuid::new_v4(), HashMap::new()).await;

        let (sa, sb) = (store.clone(), store.clone());
        let (ida, idb) = (a.clone(), b.clone());
        let ta = tokio::spawn(async move {
            for i in 0..100 {
                sa.set(&ida, "n", json!(i)).await.unwrap();
            }
        });
        let tb = tokio::spawn(async move {
            for _ in 0..100 {
                sb.flush(&idb).await;
            }
        });
        ta.await.unwrap();
        tb.await.unwrap();

        let snapshot = store.get(&a).await.unwrap();
        assert_eq!(snapshot.payload["n"], json!(99));
        assert!(matches!(store.get(&b).await, Err(AuthError::SessionNotFound)));
    }
}
