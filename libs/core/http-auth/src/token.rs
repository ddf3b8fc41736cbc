use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::errors::{AuthError, AuthResult};
use crate::revocation::RevocationList;

/// Distinguishes the two token roles; a refresh token presented where an
/// access token is expected is invalid, not merely long-lived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,        // Subject (user ID)
    pub username: String,   // Login identifier
    pub roles: Vec<String>, // User roles
    pub kind: TokenKind,    // Access or refresh
    pub exp: i64,           // Expiration time
    pub iat: i64,           // Issued at
    pub jti: String,        // Token ID (revocation key)
}

impl Claims {
    pub fn user_id(&self) -> AuthResult<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| AuthError::TokenInvalid)
    }
}

/// An access/refresh pair returned by `issue` and `refresh`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Stateless HS256 token service.
///
/// Access-token verification is pure signature+expiry checking with no shared
/// state, so the request hot path never contends on a store. Only `refresh`
/// and `revoke` touch the revocation list.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    refresh_single_use: bool,
    revocations: RevocationList,
}

impl TokenService {
    pub fn new(
        secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
        refresh_single_use: bool,
        revocations: RevocationList,
    ) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
            refresh_single_use,
            revocations,
        }
    }

    /// Issue a fresh access/refresh pair for a user.
    pub fn issue(&self, user_id: Uuid, username: &str, roles: &[String]) -> AuthResult<TokenPair> {
        let access = self.mint(user_id, username, roles, TokenKind::Access, self.access_ttl)?;
        let refresh = self.mint(user_id, username, roles, TokenKind::Refresh, self.refresh_ttl)?;
        Ok(TokenPair { access, refresh })
    }

    /// Verify an access token: signature, expiry, and kind.
    pub fn verify_access(&self, token: &str) -> AuthResult<Claims> {
        let claims = self.decode_claims(token)?;
        if claims.kind != TokenKind::Access {
            return Err(AuthError::TokenInvalid);
        }
        Ok(claims)
    }

    /// Verify a refresh token, including the revocation list.
    pub async fn verify_refresh(&self, token: &str) -> AuthResult<Claims> {
        let claims = self.decode_claims(token)?;
        if claims.kind != TokenKind::Refresh {
            return Err(AuthError::TokenInvalid);
        }
        if self.revocations.contains(&claims.jti).await {
            return Err(AuthError::TokenRevoked);
        }
        Ok(claims)
    }

    /// Exchange a refresh token for a new pair.
    ///
    /// With single-use rotation the consumed `jti` is revoked atomically with
    /// the check, so a replayed refresh token fails even under concurrency.
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        let claims = self.verify_refresh(refresh_token).await?;

        if self.refresh_single_use {
            // The revocation decision is the atomic check-and-insert here,
            // not the advisory lookup in verify_refresh.
            let remaining = Self::remaining_ttl(claims.exp);
            if !self.revocations.revoke_once(&claims.jti, remaining).await {
                tracing::debug!(jti = %claims.jti, "Refresh token replayed after use");
                return Err(AuthError::TokenRevoked);
            }
        }

        let user_id = claims.user_id()?;
        self.issue(user_id, &claims.username, &claims.roles)
    }

    /// Revoke a refresh token so future refreshes fail.
    ///
    /// Idempotent, and tolerant of garbage input: a token whose `jti` cannot
    /// be recovered has nothing to revoke.
    pub async fn revoke(&self, refresh_token: &str) {
        // Expired tokens still decode here; revoking them is a harmless no-op
        // that keeps logout idempotent.
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation.validate_exp = false;

        match decode::<Claims>(refresh_token, &self.decoding, &validation) {
            Ok(data) => {
                let remaining = Self::remaining_ttl(data.claims.exp);
                self.revocations.revoke(&data.claims.jti, remaining).await;
                tracing::debug!(jti = %data.claims.jti, "Revoked refresh token");
            }
            Err(e) => {
                tracing::debug!("Ignoring revoke of undecodable token: {}", e);
            }
        }
    }

    fn mint(
        &self,
        user_id: Uuid,
        username: &str,
        roles: &[String],
        kind: TokenKind,
        ttl: Duration,
    ) -> AuthResult<String> {
        let now = Utc::now();
        let ttl = ChronoDuration::from_std(ttl)
            .map_err(|e| AuthError::Internal(format!("token ttl out of range: {}", e)))?;

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            roles: roles.to_vec(),
            kind,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let header = Header {
            alg: jsonwebtoken::Algorithm::HS256,
            ..Default::default()
        };

        encode(&header, &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("Failed to encode token: {}", e)))
    }

    fn decode_claims(&self, token: &str) -> AuthResult<Claims> {
        let mut validation = Validation::default();
        // The default 60s leeway would blur the expiry boundary.
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid,
            })
    }

    fn remaining_ttl(exp: i64) -> Duration {
        let remaining = exp - Utc::now().timestamp();
        Duration::from_secs(remaining.max(0) as u64)
    }

    /// Encode claims as-is. Test hook for crafting tokens at chosen instants.
    #[cfg(test)]
    fn encode_raw(&self, claims: &Claims) -> String {
        encode(
            &Header {
                alg: jsonwebtoken::Algorithm::HS256,
                ..Default::default()
            },
            claims,
            &self.encoding,
        )
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret-0123456789";

    fn service(single_use: bool) -> TokenService {
        TokenService::new(
            SECRET,
            Duration::from_secs(900),
            Duration::from_secs(604_800),
            single_use,
            RevocationList::new(),
        )
    }

    fn claims_at(kind: TokenKind, iat: i64, exp: i64) -> Claims {
        Claims {
            sub: Uuid::new_v4().to_string(),
            username: "maria".to_string(),
            roles: vec!["user".to_string()],
            kind,
            exp,
            iat,
            jti: Uuid::new_v4().to_string(),
        }
    }

    #[test]
    fn test_issue_and_verify_access() {
        let svc = service(true);
        let user_id = Uuid::new_v4();
        let pair = svc.issue(user_id, "maria", &["user".to_string()]).unwrap();

        let claims = svc.verify_access(&pair.access).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.username, "maria");
        assert_eq!(claims.kind, TokenKind::Access);
    }

    #[test]
    fn test_access_token_expiry_boundary() {
        let svc = service(true);
        let now = Utc::now().timestamp();

        // Issued 14m59s ago with a 15m TTL: still valid.
        let live = claims_at(TokenKind::Access, now - 899, now + 1);
        assert!(svc.verify_access(&svc.encode_raw(&live)).is_ok());

        // Issued 15m01s ago with a 15m TTL: expired, not invalid.
        let stale = claims_at(TokenKind::Access, now - 901, now - 1);
        assert!(matches!(
            svc.verify_access(&svc.encode_raw(&stale)),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_tampered_token_is_invalid() {
        let svc = service(true);
        let pair = svc
            .issue(Uuid::new_v4(), "maria", &["user".to_string()])
            .unwrap();

        let mut tampered = pair.access.clone();
        tampered.pop();
        tampered.push('A');
        assert!(matches!(
            svc.verify_access(&tampered),
            Err(AuthError::TokenInvalid)
        ));

        assert!(matches!(
            svc.verify_access("not-a-jwt"),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let svc = service(true);
        let pair = svc
            .issue(Uuid::new_v4(), "maria", &["user".to_string()])
            .unwrap();
        assert!(matches!(
            svc.verify_access(&pair.refresh),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[tokio::test]
    async fn test_single_use_refresh_replay_fails() {
        let svc = service(true);
        let pair = svc
            .issue(Uuid::new_v4(), "maria", &["user".to_string()])
            .unwrap();

        let rotated = svc.refresh(&pair.refresh).await.unwrap();
        assert!(svc.verify_access(&rotated.access).is_ok());

        // Second use of the consumed refresh token is a replay.
        assert!(matches!(
            svc.refresh(&pair.refresh).await,
            Err(AuthError::TokenRevoked)
        ));
        // The replacement still works.
        assert!(svc.refresh(&rotated.refresh).await.is_ok());
    }

    #[tokio::test]
    async fn test_reusable_refresh_when_single_use_disabled() {
        let svc = service(false);
        let pair = svc
            .issue(Uuid::new_v4(), "maria", &["user".to_string()])
            .unwrap();

        assert!(svc.refresh(&pair.refresh).await.is_ok());
        assert!(svc.refresh(&pair.refresh).await.is_ok());
    }

    #[tokio::test]
    async fn test_revoke_blocks_refresh_and_is_idempotent() {
        let svc = service(false);
        let pair = svc
            .issue(Uuid::new_v4(), "maria", &["user".to_string()])
            .unwrap();

        svc.revoke(&pair.refresh).await;
        svc.revoke(&pair.refresh).await;
        assert!(matches!(
            svc.refresh(&pair.refresh).await,
            Err(AuthError::TokenRevoked)
        ));
        assert!(matches!(
            svc.verify_refresh(&pair.refresh).await,
            Err(AuthError::TokenRevoked)
        ));

        // Garbage input is ignored rather than erroring.
        svc.revoke("garbage").await;
    }

    #[tokio::test]
    async fn test_expired_refresh_reports_expired() {
        let svc = service(true);
        let now = Utc::now().timestamp();
        let stale = claims_at(TokenKind::Refresh, now - 7200, now - 3600);
        assert!(matches!(
            svc.refresh(&svc.encode_raw(&stale)).await,
            Err(AuthError::TokenExpired)
        ));
    }
}
