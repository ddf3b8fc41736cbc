use http_auth::AuthError;
use thiserror::Error;

/// Internal outcome of a credential check.
///
/// `NotFound` and `BadSecret` exist for logs and tests only; at the HTTP
/// boundary both map onto the same `InvalidCredentials` so callers cannot
/// enumerate accounts.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("no user with that identifier")]
    NotFound,

    #[error("account is inactive")]
    Inactive,

    #[error("secret does not match")]
    BadSecret,

    #[error("password hash error: {0}")]
    Hash(String),

    #[error("directory error: {0}")]
    Directory(String),
}

impl From<VerifyError> for AuthError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::NotFound | VerifyError::BadSecret => AuthError::InvalidCredentials,
            VerifyError::Inactive => AuthError::InactiveAccount,
            VerifyError::Hash(msg) => AuthError::Internal(msg),
            VerifyError::Directory(msg) => AuthError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_and_bad_secret_collapse() {
        assert!(matches!(
            AuthError::from(VerifyError::NotFound),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            AuthError::from(VerifyError::BadSecret),
            AuthError::InvalidCredentials
        ));
    }

    #[test]
    fn test_inactive_is_distinct() {
        assert!(matches!(
            AuthError::from(VerifyError::Inactive),
            AuthError::InactiveAccount
        ));
    }
}
