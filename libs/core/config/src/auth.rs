use crate::{env_bool, env_or_default, env_parse, env_required, ConfigError, Environment, FromEnv};
use std::time::Duration;

/// Fallback signing secret for local development only.
const DEV_SECRET: &str = "dev-secret-do-not-use-in-production";

/// Lifetimes and key material for sessions and tokens.
///
/// All intervals are read as whole seconds. The signing secret is required in
/// production; development falls back to a fixed placeholder so the stack can
/// run without setup.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// Session lifetime from creation (or last touch when sliding)
    pub session_ttl: Duration,
    /// Extend session expiry on every authenticated request
    pub session_sliding: bool,
    /// Interval between background sweeps of expired sessions/revocations
    pub sweep_interval: Duration,
    /// Access token lifetime (short)
    pub access_ttl: Duration,
    /// Refresh token lifetime (long)
    pub refresh_ttl: Duration,
    /// Consume refresh tokens on use (rotation with replay protection)
    pub refresh_single_use: bool,
    /// HMAC secret for token signing
    pub secret: String,
    /// Upper bound on identity resolution inside the gate
    pub resolve_timeout: Duration,
}

impl AuthConfig {
    /// Load from environment, enforcing an explicit secret in production.
    pub fn load(environment: &Environment) -> Result<Self, ConfigError> {
        let secret = if environment.is_production() {
            env_required("AUTH_SECRET")?
        } else {
            env_or_default("AUTH_SECRET", DEV_SECRET)
        };

        if secret.len() < 16 {
            return Err(ConfigError::Invalid(
                "AUTH_SECRET must be at least 16 bytes".to_string(),
            ));
        }

        Ok(Self {
            session_ttl: Duration::from_secs(env_parse("SESSION_TTL_SECS", 86_400u64)?),
            session_sliding: env_bool("SESSION_SLIDING", true),
            sweep_interval: Duration::from_secs(env_parse("SESSION_SWEEP_INTERVAL_SECS", 60u64)?),
            access_ttl: Duration::from_secs(env_parse("ACCESS_TOKEN_TTL_SECS", 900u64)?),
            refresh_ttl: Duration::from_secs(env_parse("REFRESH_TOKEN_TTL_SECS", 604_800u64)?),
            refresh_single_use: env_bool("REFRESH_SINGLE_USE", true),
            secret,
            resolve_timeout: Duration::from_millis(env_parse("RESOLVE_TIMEOUT_MS", 500u64)?),
        })
    }
}

impl FromEnv for AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Self::load(&Environment::from_env())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_config_dev_defaults() {
        temp_env::with_vars(
            [
                ("APP_ENV", None::<&str>),
                ("AUTH_SECRET", None),
                ("SESSION_TTL_SECS", None),
                ("ACCESS_TOKEN_TTL_SECS", None),
                ("REFRESH_TOKEN_TTL_SECS", None),
                ("SESSION_SLIDING", None),
                ("REFRESH_SINGLE_USE", None),
                ("SESSION_SWEEP_INTERVAL_SECS", None),
                ("RESOLVE_TIMEOUT_MS", None),
            ],
            || {
                let config = AuthConfig::from_env().unwrap();
                assert_eq!(config.session_ttl, Duration::from_secs(86_400));
                assert_eq!(config.access_ttl, Duration::from_secs(900));
                assert_eq!(config.refresh_ttl, Duration::from_secs(604_800));
                assert!(config.session_sliding);
                assert!(config.refresh_single_use);
                assert_eq!(config.secret, DEV_SECRET);
            },
        );
    }

    #[test]
    fn test_auth_config_production_requires_secret() {
        temp_env::with_vars(
            [("APP_ENV", Some("production")), ("AUTH_SECRET", None)],
            || {
                let err = AuthConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("AUTH_SECRET"));
            },
        );
    }

    #[test]
    fn test_auth_config_rejects_short_secret() {
        temp_env::with_vars(
            [("APP_ENV", None::<&str>), ("AUTH_SECRET", Some("short"))],
            || {
                assert!(AuthConfig::from_env().is_err());
            },
        );
    }

    #[test]
    fn test_auth_config_custom_ttls() {
        temp_env::with_vars(
            [
                ("APP_ENV", None::<&str>),
                ("AUTH_SECRET", None),
                ("SESSION_TTL_SECS", Some("120")),
                ("ACCESS_TOKEN_TTL_SECS", Some("60")),
                ("SESSION_SLIDING", Some("false")),
            ],
            || {
                let config = AuthConfig::from_env().unwrap();
                assert_eq!(config.session_ttl, Duration::from_secs(120));
                assert_eq!(config.access_ttl, Duration::from_secs(60));
                assert!(!config.session_sliding);
            },
        );
    }
}
