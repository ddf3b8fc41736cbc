use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use core_config::cookie::CookieConfig;
use http_auth::{
    expired_session_cookie, extract_cookie, session_cookie, AuthError, Identity, SessionId,
    SessionStore, TokenService, ValidatedJson,
};
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

use crate::directory::UserDirectory;
use crate::models::{LoginRequest, LogoutRequest, MeResponse, RefreshRequest, TokenRequest, User};
use crate::verifier::CredentialVerifier;

/// State shared by the auth endpoints
#[derive(Clone)]
pub struct AuthState<D: UserDirectory> {
    pub verifier: CredentialVerifier<D>,
    pub sessions: SessionStore,
    pub tokens: TokenService,
    pub cookie: CookieConfig,
    pub session_ttl: Duration,
    pub post_login_redirect: String,
}

/// Session payload keys the orchestrator writes at login.
///
/// The payload map stays open for app data, but these two are the recognized
/// keys the gate reads back.
pub const PAYLOAD_USERNAME: &str = "username";
pub const PAYLOAD_ROLES: &str = "roles";

/// Login with username/password, establishing a session (browser flow)
async fn login<D: UserDirectory>(
    axum::extract::State(state): axum::extract::State<AuthState<D>>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> Result<Response, AuthError> {
    let user = state
        .verifier
        .verify(&input.username, &input.password)
        .await?;

    let session_id = state
        .sessions
        .create(user.id, initial_payload(&user))
        .await;

    let cookie = session_cookie(&state.cookie, &session_id, state.session_ttl.as_secs());
    let cookie = HeaderValue::from_str(&cookie)
        .map_err(|e| AuthError::Internal(format!("Failed to build session cookie: {}", e)))?;

    let destination = input
        .next
        .as_deref()
        .filter(|next| is_safe_redirect(next))
        .unwrap_or(&state.post_login_redirect)
        .to_string();

    tracing::info!(user_id = %user.id, "Login succeeded, session established");

    Ok((
        StatusCode::SEE_OTHER,
        [
            (header::SET_COOKIE, cookie),
            (
                header::LOCATION,
                HeaderValue::from_str(&destination)
                    .map_err(|e| AuthError::Internal(format!("Bad redirect target: {}", e)))?,
            ),
        ],
    )
        .into_response())
}

/// Login with username/password, returning an access/refresh pair (API flow)
async fn token<D: UserDirectory>(
    axum::extract::State(state): axum::extract::State<AuthState<D>>,
    ValidatedJson(input): ValidatedJson<TokenRequest>,
) -> Result<Response, AuthError> {
    let user = state
        .verifier
        .verify(&input.username, &input.password)
        .await?;

    let pair = state
        .tokens
        .issue(user.id, &user.username, &user.role_names())?;

    tracing::info!(user_id = %user.id, "Login succeeded, token pair issued");
    Ok(Json(pair).into_response())
}

/// Exchange a refresh token for a new pair
async fn refresh<D: UserDirectory>(
    axum::extract::State(state): axum::extract::State<AuthState<D>>,
    ValidatedJson(input): ValidatedJson<RefreshRequest>,
) -> Result<Response, AuthError> {
    let pair = state.tokens.refresh(&input.refresh).await?;
    Ok(Json(pair).into_response())
}

/// Invalidate the caller's session and/or refresh token.
///
/// Always succeeds: logging out twice, or with nothing to invalidate, is not
/// an error.
async fn logout<D: UserDirectory>(
    axum::extract::State(state): axum::extract::State<AuthState<D>>,
    headers: HeaderMap,
    body: Option<Json<LogoutRequest>>,
) -> Result<Response, AuthError> {
    if let Some(raw) = extract_cookie(&headers, &state.cookie.name) {
        state.sessions.flush(&SessionId::from(raw.as_str())).await;
    }

    if let Some(Json(LogoutRequest {
        refresh: Some(refresh_token),
    })) = body
    {
        state.tokens.revoke(&refresh_token).await;
    }

    let clear = HeaderValue::from_str(&expired_session_cookie(&state.cookie))
        .map_err(|e| AuthError::Internal(format!("Failed to build clearing cookie: {}", e)))?;

    Ok((
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, clear)],
    )
        .into_response())
}

/// Echo the gate-attached identity (protected route)
async fn me(identity: Identity) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: identity.user_id,
        username: identity.username,
        roles: identity.roles,
    })
}

/// Placeholder login page so browser-mode redirects land somewhere real.
/// Public so the binary can also mount it at the redirect target.
pub async fn login_page() -> Json<serde_json::Value> {
    Json(json!({ "message": "POST credentials to /auth/login" }))
}

fn initial_payload(user: &User) -> HashMap<String, serde_json::Value> {
    let mut payload = HashMap::new();
    payload.insert(PAYLOAD_USERNAME.to_string(), json!(user.username));
    payload.insert(PAYLOAD_ROLES.to_string(), json!(user.role_names()));
    payload
}

/// Only same-site absolute paths are honored as post-login destinations.
fn is_safe_redirect(next: &str) -> bool {
    next.starts_with('/') && !next.starts_with("//") && !next.contains('\\')
}

/// Create the auth router
pub fn auth_router<D>(state: AuthState<D>) -> Router
where
    D: UserDirectory + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/login", get(login_page).post(login::<D>))
        .route("/token", post(token::<D>))
        .route("/refresh", post(refresh::<D>))
        .route("/logout", post(logout::<D>))
        .route("/me", get(me))
        .with_state(state)
}
