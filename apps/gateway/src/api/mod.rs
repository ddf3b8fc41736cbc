//! API routes module

pub mod dashboard;
pub mod health;

use axum::{routing::get, Router};
use domain_users::{auth_router, login_page, AuthState};

use crate::state::AppState;

/// Create all API routes
pub fn routes(state: &AppState) -> Router {
    let auth = AuthState {
        verifier: state.verifier.clone(),
        sessions: state.sessions.clone(),
        tokens: state.tokens.clone(),
        cookie: state.config.cookie.clone(),
        session_ttl: state.config.auth.session_ttl,
        post_login_redirect: state.config.policy.post_login_redirect.clone(),
    };

    Router::new()
        .nest("/auth", auth_router(auth))
        .nest("/dashboard", dashboard::router())
        .route("/login", get(login_page))
        .merge(health::router(state.clone()))
}
