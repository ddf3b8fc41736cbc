use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use core_config::{cookie::CookieConfig, policy::GateMode};
use std::sync::Arc;
use std::time::Duration;

use crate::cookies::{extract_bearer, extract_cookie};
use crate::identity::{Identity, IdentitySource};
use crate::policy::{PathClass, RoutePolicy};
use crate::session::{SessionId, SessionStore};
use crate::token::TokenService;

/// Everything the access gate needs per request
#[derive(Clone)]
pub struct GateState {
    pub policy: Arc<RoutePolicy>,
    pub sessions: SessionStore,
    pub tokens: TokenService,
    pub cookie: CookieConfig,
    pub mode: GateMode,
    pub login_redirect: String,
    pub resolve_timeout: Duration,
}

/// Access gate middleware.
///
/// Per request: classify the path, resolve an identity only for protected
/// paths, then either forward with the identity attached or deny. Identity
/// resolution runs under a deadline and fails closed: if the session store or
/// token check cannot answer in time the caller stays anonymous.
pub async fn access_gate(
    State(gate): State<GateState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    match gate.policy.classify(&path) {
        // Exempt and public paths skip identity resolution entirely.
        PathClass::Exempt | PathClass::Public => next.run(request).await,
        PathClass::Protected => {
            let resolved = tokio::time::timeout(
                gate.resolve_timeout,
                resolve_identity(&gate, request.headers()),
            )
            .await;

            match resolved {
                Ok(Some(identity)) => {
                    tracing::debug!(user_id = %identity.user_id, %path, "Request authenticated");
                    request.extensions_mut().insert(identity);
                    next.run(request).await
                }
                Ok(None) => deny(&gate, &path),
                Err(_) => {
                    tracing::warn!(%path, "Identity resolution deadline exceeded, failing closed");
                    deny(&gate, &path)
                }
            }
        }
    }
}

/// Try the session cookie, then a bearer access token.
///
/// Every failure mode (absent, expired, invalid, revoked) resolves to
/// anonymous here; the gate turns anonymity into the mode-appropriate denial.
async fn resolve_identity(gate: &GateState, headers: &HeaderMap) -> Option<Identity> {
    if let Some(raw) = extract_cookie(headers, &gate.cookie.name) {
        let id = SessionId::from(raw.as_str());
        match gate.sessions.get(&id).await {
            Ok(snapshot) => {
                if gate.sessions.sliding() {
                    let _ = gate.sessions.touch(&id).await;
                }
                let username = snapshot
                    .payload
                    .get("username")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                let roles = snapshot
                    .payload
                    .get("roles")
                    .and_then(|v| v.as_array())
                    .map(|values| {
                        values
                            .iter()
                            .filter_map(|v| v.as_str().map(String::from))
                            .collect()
                    })
                    .unwrap_or_default();
                return Some(Identity {
                    user_id: snapshot.user_id,
                    username,
                    roles,
                    source: IdentitySource::Session,
                });
            }
            Err(e) => {
                tracing::debug!("Session cookie did not resolve: {}", e);
            }
        }
    }

    if let Some(token) = extract_bearer(headers) {
        match gate.tokens.verify_access(&token) {
            Ok(claims) => match claims.user_id() {
                Ok(user_id) => {
                    return Some(Identity {
                        user_id,
                        username: claims.username,
                        roles: claims.roles,
                        source: IdentitySource::Bearer,
                    })
                }
                Err(_) => {
                    tracing::debug!("Access token subject is not a valid user id");
                }
            },
            Err(e) => {
                tracing::debug!("Bearer token did not resolve: {}", e);
            }
        }
    }

    None
}

fn deny(gate: &GateState, path: &str) -> Response {
    match gate.mode {
        GateMode::Browser => {
            let location = format!(
                "{}?next={}",
                gate.login_redirect,
                urlencoding::encode(path)
            );
            (
                StatusCode::SEE_OTHER,
                [(header::LOCATION, location)],
            )
                .into_response()
        }
        GateMode::Api => crate::errors::AuthError::AuthenticationRequired.into_response(),
    }
}
