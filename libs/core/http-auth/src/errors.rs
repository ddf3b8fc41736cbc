use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Authentication and gating errors.
///
/// The externally visible response never distinguishes "unknown user" from
/// "wrong password", and token failures all collapse into a generic
/// authentication-required body. Internal detail stays in logs.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is inactive")]
    InactiveAccount,

    #[error("Session expired")]
    SessionExpired,

    #[error("Session not found")]
    SessionNotFound,

    #[error("Token is malformed or has a bad signature")]
    TokenInvalid,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token revoked")]
    TokenRevoked,

    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Route policy misconfigured: {0}")]
    PolicyMisconfigured(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Whether the gate may recover this locally by treating the caller as
    /// anonymous instead of failing the request.
    pub fn is_anonymous_recoverable(&self) -> bool {
        matches!(
            self,
            AuthError::SessionExpired
                | AuthError::SessionNotFound
                | AuthError::TokenInvalid
                | AuthError::TokenExpired
                | AuthError::TokenRevoked
        )
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            // One uniform shape for every credential failure: no user
            // enumeration through status, type, or message.
            AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "Invalid username or password".to_string(),
            ),
            AuthError::InactiveAccount => (
                StatusCode::FORBIDDEN,
                "inactive_account",
                "Account is inactive".to_string(),
            ),
            AuthError::SessionExpired
            | AuthError::SessionNotFound
            | AuthError::TokenInvalid
            | AuthError::TokenExpired
            | AuthError::TokenRevoked
            | AuthError::AuthenticationRequired => (
                StatusCode::UNAUTHORIZED,
                "authentication_required",
                "Authentication required".to_string(),
            ),
            // Never served: validation happens at startup and refuses to boot.
            AuthError::PolicyMisconfigured(msg) => {
                tracing::error!("Route policy misconfigured: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AuthError::Internal(msg) => {
                tracing::error!("Internal auth error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message
            }
        }));

        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}
