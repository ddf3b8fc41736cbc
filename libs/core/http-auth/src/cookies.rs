use axum::http::HeaderMap;
use core_config::cookie::CookieConfig;

use crate::session::SessionId;

/// Build the Set-Cookie value for a freshly created session.
///
/// HttpOnly always; Secure and SameSite follow configuration.
pub fn session_cookie(config: &CookieConfig, id: &SessionId, max_age_secs: u64) -> String {
    let secure = if config.secure { " Secure;" } else { "" };
    format!(
        "{}={}; HttpOnly;{} SameSite={}; Path=/; Max-Age={}",
        config.name,
        id,
        secure,
        config.same_site.as_str(),
        max_age_secs
    )
}

/// Build the Set-Cookie value that clears the session cookie on logout.
pub fn expired_session_cookie(config: &CookieConfig) -> String {
    let secure = if config.secure { " Secure;" } else { "" };
    format!(
        "{}=; HttpOnly;{} SameSite={}; Path=/; Max-Age=0",
        config.name,
        secure,
        config.same_site.as_str()
    )
}

/// Extract a cookie value by name from request headers.
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get("cookie")
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').find_map(|cookie| {
                let parts: Vec<&str> = cookie.trim().splitn(2, '=').collect();
                if parts.len() == 2 && parts[0] == name {
                    Some(parts[1].to_string())
                } else {
                    None
                }
            })
        })
}

/// Extract a bearer token from the Authorization header.
pub fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer ").map(|s| s.to_string()))
}
