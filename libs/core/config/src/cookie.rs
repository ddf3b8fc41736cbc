use crate::{env_or_default, ConfigError, Environment};

/// SameSite policy for the session cookie
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
        }
    }
}

/// Security attributes for the session cookie.
///
/// `HttpOnly` is unconditional; `Secure` follows the environment.
#[derive(Clone, Debug)]
pub struct CookieConfig {
    pub name: String,
    pub secure: bool,
    pub same_site: SameSite,
}

impl CookieConfig {
    pub fn load(environment: &Environment) -> Result<Self, ConfigError> {
        let name = env_or_default("SESSION_COOKIE_NAME", "sid");
        if name.is_empty() || name.contains(['=', ';', ' ']) {
            return Err(ConfigError::Invalid(format!(
                "SESSION_COOKIE_NAME '{}' is not a valid cookie name",
                name
            )));
        }

        let same_site = match env_or_default("SESSION_COOKIE_SAMESITE", "strict")
            .to_lowercase()
            .as_str()
        {
            "lax" => SameSite::Lax,
            "strict" => SameSite::Strict,
            other => {
                return Err(ConfigError::Invalid(format!(
                    "SESSION_COOKIE_SAMESITE must be 'strict' or 'lax', got '{}'",
                    other
                )))
            }
        };

        Ok(Self {
            name,
            secure: environment.use_secure_cookies(),
            same_site,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_config_defaults() {
        temp_env::with_vars(
            [
                ("SESSION_COOKIE_NAME", None::<&str>),
                ("SESSION_COOKIE_SAMESITE", None),
            ],
            || {
                let config = CookieConfig::load(&Environment::Development).unwrap();
                assert_eq!(config.name, "sid");
                assert!(!config.secure);
                assert_eq!(config.same_site, SameSite::Strict);
            },
        );
    }

    #[test]
    fn test_cookie_config_secure_in_production() {
        temp_env::with_var_unset("SESSION_COOKIE_NAME", || {
            let config = CookieConfig::load(&Environment::Production).unwrap();
            assert!(config.secure);
        });
    }

    #[test]
    fn test_cookie_config_rejects_bad_name() {
        temp_env::with_var("SESSION_COOKIE_NAME", Some("a=b"), || {
            assert!(CookieConfig::load(&Environment::Development).is_err());
        });
    }

    #[test]
    fn test_cookie_config_lax() {
        temp_env::with_vars(
            [
                ("SESSION_COOKIE_NAME", None::<&str>),
                ("SESSION_COOKIE_SAMESITE", Some("Lax")),
            ],
            || {
                let config = CookieConfig::load(&Environment::Development).unwrap();
                assert_eq!(config.same_site, SameSite::Lax);
            },
        );
    }

    #[test]
    fn test_cookie_config_rejects_unknown_samesite() {
        temp_env::with_var("SESSION_COOKIE_SAMESITE", Some("none"), || {
            assert!(CookieConfig::load(&Environment::Development).is_err());
        });
    }
}
