use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::VerifyError;
use crate::models::User;

/// Narrow capability contract over the external user directory.
///
/// The core only ever needs lookup-by-identifier plus a login-time stamp;
/// everything else about user management belongs to whoever owns the
/// directory. Implementations are swappable (in-memory here, a database in a
/// real deployment).
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve a user by their login identifier.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, VerifyError>;

    /// Record a successful login.
    async fn record_login(&self, id: Uuid) -> Result<(), VerifyError>;
}

/// In-memory implementation of UserDirectory (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a user whose password hash is already computed.
    pub async fn insert(&self, user: User) {
        let mut users = self.users.write().await;
        tracing::debug!(user_id = %user.id, username = %user.username, "Inserted user");
        users.insert(user.id, user);
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, VerifyError> {
        let users = self.users.read().await;
        let user = users
            .values()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned();
        Ok(user)
    }

    async fn record_login(&self, id: Uuid) -> Result<(), VerifyError> {
        let mut users = self.users.write().await;
        match users.get_mut(&id) {
            Some(user) => {
                user.last_login_at = Some(Utc::now());
                Ok(())
            }
            None => Err(VerifyError::Directory(format!("no user with id {}", id))),
        }
    }
}
