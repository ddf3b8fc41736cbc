//! Configuration for the gateway

use core_config::{
    auth::AuthConfig, cookie::CookieConfig, policy::PolicyConfig, server::ServerConfig, FromEnv,
};

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub cookie: CookieConfig,
    pub policy: PolicyConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let auth = AuthConfig::load(&environment)?;
        let cookie = CookieConfig::load(&environment)?;
        let mut policy = PolicyConfig::from_env()?;

        // With no operator-provided prefixes, protect the sample dashboard
        // and the identity echo, and exempt the credential endpoints that
        // must stay reachable while logged out.
        if policy.protected_prefixes.is_empty() {
            policy.protected_prefixes = vec!["/dashboard".to_string(), "/auth/me".to_string()];
        }
        if policy.exempt_prefixes.is_empty() {
            policy.exempt_prefixes = vec![
                "/auth/login".to_string(),
                "/auth/token".to_string(),
                "/auth/refresh".to_string(),
                "/auth/logout".to_string(),
                "/login".to_string(),
            ];
        }

        Ok(Self {
            environment,
            server,
            auth,
            cookie,
            policy,
        })
    }
}
