use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::Arc;

use crate::directory::UserDirectory;
use crate::error::VerifyError;
use crate::models::User;

/// Hash a plaintext password into an Argon2 PHC string.
///
/// Used when seeding the directory; the verifier itself only ever compares.
pub fn hash_password(password: &str) -> Result<String, VerifyError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| VerifyError::Hash(e.to_string()))
}

/// Checks a presented identifier+secret against the directory.
///
/// Read-only: no lockout state lives here. Argon2 verification is the
/// constant-time comparison; on an unknown identifier the same work runs
/// against a throwaway hash so lookup misses are not observable through
/// timing. The plaintext secret never reaches a log line.
#[derive(Clone)]
pub struct CredentialVerifier<D: UserDirectory> {
    directory: Arc<D>,
    dummy_hash: String,
}

impl<D: UserDirectory> CredentialVerifier<D> {
    pub fn new(directory: Arc<D>) -> Result<Self, VerifyError> {
        // Hash of a random value nobody knows; only its cost profile matters.
        let dummy_hash = hash_password(&uuid::Uuid::new_v4().to_string())?;
        Ok(Self {
            directory,
            dummy_hash,
        })
    }

    /// Verify credentials and return the matching user.
    pub async fn verify(&self, username: &str, password: &str) -> Result<User, VerifyError> {
        let user = match self.directory.find_by_username(username).await? {
            Some(user) => user,
            None => {
                // Burn the same hashing work as the found path.
                let _ = self.compare(password, &self.dummy_hash);
                tracing::debug!("Credential check failed for unknown identifier");
                return Err(VerifyError::NotFound);
            }
        };

        if !user.is_active {
            tracing::debug!(user_id = %user.id, "Credential check against inactive account");
            return Err(VerifyError::Inactive);
        }

        if !self.compare(password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "Credential check failed");
            return Err(VerifyError::BadSecret);
        }

        self.directory.record_login(user.id).await?;
        tracing::info!(user_id = %user.id, username = %user.username, "Credentials verified");
        Ok(user)
    }

    fn compare(&self, password: &str, hash: &str) -> Result<bool, VerifyError> {
        let parsed = PasswordHash::new(hash).map_err(|e| VerifyError::Hash(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}
