use axum::{extract::FromRequestParts, http::request::Parts};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AuthError;

/// Where a request's identity was resolved from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentitySource {
    Session,
    Bearer,
}

/// Request-scoped identity attached by the access gate.
///
/// Set exactly once per request, read-only downstream. There is no ambient
/// "current user"; handlers receive this value through request extensions.
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
    pub roles: Vec<String>,
    pub source: IdentitySource,
}

impl Identity {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Extractor for handlers behind the gate.
///
/// Rejects with 401 when no identity was attached, which only happens if a
/// handler using this extractor is mounted outside a protected prefix.
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or(AuthError::AuthenticationRequired)
    }
}
