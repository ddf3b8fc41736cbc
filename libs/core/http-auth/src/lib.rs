//! # http_auth
//!
//! Session, token, and access-gating building blocks for axum services.
//!
//! ## Modules
//!
//! - **[`session`]**: in-memory session store with lazy and swept expiry
//! - **[`token`]**: stateless HS256 access/refresh tokens with rotation
//! - **[`revocation`]**: TTL'd revocation list consulted on refresh
//! - **[`policy`]**: path-prefix route policy (exempt beats protected)
//! - **[`gate`]**: per-request access gate middleware
//! - **[`identity`]**: request-scoped identity value and extractor
//! - **[`cookies`]**: session cookie construction and header parsing
//! - **[`extractors`]**: validated JSON request bodies
//! - **[`sweep`]**: background expiry sweeper
//! - **[`shutdown`]**: graceful shutdown coordination

pub mod cookies;
pub mod errors;
pub mod extractors;
pub mod gate;
pub mod identity;
pub mod policy;
pub mod revocation;
pub mod session;
pub mod shutdown;
pub mod sweep;
pub mod token;

pub use cookies::{expired_session_cookie, extract_bearer, extract_cookie, session_cookie};
pub use errors::{AuthError, AuthResult};
pub use extractors::ValidatedJson;
pub use gate::{access_gate, GateState};
pub use identity::{Identity, IdentitySource};
pub use policy::{PathClass, RoutePolicy};
pub use revocation::RevocationList;
pub use session::{SessionId, SessionSnapshot, SessionStore};
pub use shutdown::{shutdown_signal, ShutdownCoordinator};
pub use sweep::spawn_sweeper;
pub use token::{Claims, TokenKind, TokenPair, TokenService};
