//! User directory, credential verification, and the login/logout
//! orchestration endpoints.

pub mod auth_handlers;
pub mod directory;
pub mod error;
pub mod models;
pub mod verifier;

pub use auth_handlers::{auth_router, login_page, AuthState};
pub use directory::{InMemoryUserDirectory, UserDirectory};
pub use error::VerifyError;
pub use models::{Role, User};
pub use verifier::{hash_password, CredentialVerifier};
