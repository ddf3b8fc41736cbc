//! Application state management

use domain_users::{CredentialVerifier, InMemoryUserDirectory};
use http_auth::{SessionStore, TokenService};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub verifier: CredentialVerifier<InMemoryUserDirectory>,
    pub sessions: SessionStore,
    pub tokens: TokenService,
}
