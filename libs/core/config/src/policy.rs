use crate::{env_list, env_or_default, ConfigError, FromEnv};

/// How the gate answers an unauthenticated request on a protected path
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateMode {
    /// Redirect to the login location (cookie/session flows)
    Browser,
    /// Plain 401 with WWW-Authenticate (bearer-token flows)
    Api,
}

/// Raw route-protection configuration.
///
/// Prefix semantics (precedence, overlap validation) live in the policy type
/// built from this; this struct only carries what the operator wrote.
#[derive(Clone, Debug)]
pub struct PolicyConfig {
    pub protected_prefixes: Vec<String>,
    pub exempt_prefixes: Vec<String>,
    pub login_redirect: String,
    pub post_login_redirect: String,
    pub mode: GateMode,
}

impl FromEnv for PolicyConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let mode = match env_or_default("GATE_MODE", "browser").to_lowercase().as_str() {
            "browser" => GateMode::Browser,
            "api" => GateMode::Api,
            other => {
                return Err(ConfigError::Invalid(format!(
                    "GATE_MODE must be 'browser' or 'api', got '{}'",
                    other
                )))
            }
        };

        Ok(Self {
            protected_prefixes: env_list("PROTECTED_PREFIXES"),
            exempt_prefixes: env_list("EXEMPT_PREFIXES"),
            login_redirect: env_or_default("LOGIN_REDIRECT", "/login"),
            post_login_redirect: env_or_default("POST_LOGIN_REDIRECT", "/"),
            mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_config_defaults() {
        temp_env::with_vars(
            [
                ("PROTECTED_PREFIXES", None::<&str>),
                ("EXEMPT_PREFIXES", None),
                ("GATE_MODE", None),
                ("LOGIN_REDIRECT", None),
                ("POST_LOGIN_REDIRECT", None),
            ],
            || {
                let config = PolicyConfig::from_env().unwrap();
                assert!(config.protected_prefixes.is_empty());
                assert_eq!(config.login_redirect, "/login");
                assert_eq!(config.post_login_redirect, "/");
                assert_eq!(config.mode, GateMode::Browser);
            },
        );
    }

    #[test]
    fn test_policy_config_prefix_lists() {
        temp_env::with_vars(
            [
                ("PROTECTED_PREFIXES", Some("/dashboard/,/admin/")),
                ("EXEMPT_PREFIXES", Some("/dashboard/public/")),
                ("GATE_MODE", Some("api")),
            ],
            || {
                let config = PolicyConfig::from_env().unwrap();
                assert_eq!(config.protected_prefixes, vec!["/dashboard/", "/admin/"]);
                assert_eq!(config.exempt_prefixes, vec!["/dashboard/public/"]);
                assert_eq!(config.mode, GateMode::Api);
            },
        );
    }

    #[test]
    fn test_policy_config_rejects_unknown_mode() {
        temp_env::with_var("GATE_MODE", Some("hybrid"), || {
            assert!(PolicyConfig::from_env().is_err());
        });
    }
}
