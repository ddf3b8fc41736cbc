use core_config::policy::PolicyConfig;

use crate::errors::{AuthError, AuthResult};

/// Classification of a request path under the route policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    /// Matched an exempt prefix: allowed without identity resolution
    Exempt,
    /// Matched a protected prefix: requires an identity
    Protected,
    /// Matched nothing: public route
    Public,
}

/// Path-prefix route policy.
///
/// Exemption beats protection when both match, which is what makes a login
/// page under a protected area work without redirect loops. Ambiguity among
/// the *protected* rules themselves (duplicates, one nested in another) is a
/// configuration defect and is rejected up front rather than resolved by
/// accidental ordering.
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    protected: Vec<String>,
    exempt: Vec<String>,
}

impl RoutePolicy {
    /// Build and validate a policy. Fatal at startup on ambiguous rules.
    pub fn new(protected: Vec<String>, exempt: Vec<String>) -> AuthResult<Self> {
        let protected: Vec<String> = protected.into_iter().map(normalize).collect();
        let exempt: Vec<String> = exempt.into_iter().map(normalize).collect();

        for (i, a) in protected.iter().enumerate() {
            for b in protected.iter().skip(i + 1) {
                if a == b {
                    return Err(AuthError::PolicyMisconfigured(format!(
                        "duplicate protected prefix '{}'",
                        a
                    )));
                }
                if prefix_contains(a, b) || prefix_contains(b, a) {
                    return Err(AuthError::PolicyMisconfigured(format!(
                        "overlapping protected prefixes '{}' and '{}'",
                        a, b
                    )));
                }
            }
        }

        for prefix in protected.iter().chain(exempt.iter()) {
            if !prefix.starts_with('/') {
                return Err(AuthError::PolicyMisconfigured(format!(
                    "prefix '{}' must start with '/'",
                    prefix
                )));
            }
        }

        Ok(Self { protected, exempt })
    }

    pub fn from_config(config: &PolicyConfig) -> AuthResult<Self> {
        Self::new(
            config.protected_prefixes.clone(),
            config.exempt_prefixes.clone(),
        )
    }

    /// Classify a request path. Exempt match is terminal; otherwise any
    /// protected-prefix match protects; otherwise the path is public.
    pub fn classify(&self, path: &str) -> PathClass {
        if self.exempt.iter().any(|prefix| path_matches(prefix, path)) {
            return PathClass::Exempt;
        }
        if self
            .protected
            .iter()
            .any(|prefix| path_matches(prefix, path))
        {
            return PathClass::Protected;
        }
        PathClass::Public
    }

    pub fn protected_prefixes(&self) -> &[String] {
        &self.protected
    }

    pub fn exempt_prefixes(&self) -> &[String] {
        &self.exempt
    }
}

fn normalize(mut prefix: String) -> String {
    if !prefix.starts_with('/') && !prefix.is_empty() {
        prefix.insert(0, '/');
    }
    prefix
}

/// Whether `outer` contains `inner` as a path prefix (segment-aware)
fn prefix_contains(outer: &str, inner: &str) -> bool {
    inner.starts_with(outer)
        && (outer.ends_with('/') || inner[outer.len()..].starts_with('/') || outer == inner)
}

/// Whether `path` falls under `prefix`.
///
/// "/dashboard/" matches "/dashboard/x" and the bare "/dashboard" itself;
/// "/dashboard" additionally matches on segment boundaries only, so
/// "/dashboards" stays unmatched.
fn path_matches(prefix: &str, path: &str) -> bool {
    if prefix.ends_with('/') {
        path.starts_with(prefix) || path == &prefix[..prefix.len() - 1]
    } else {
        path == prefix
            || path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}
