use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    HashingFailed(String),
    #[error("password verification failed: {0}")]
    VerificationFailed(String),
    #[error("stored password hash is malformed")]
    InvalidHashFormat,
}

/// One-way credential hashing behind a trait so the algorithm can be swapped
/// without touching the auth flow. `identifier` is the normalized email the
/// credential belongs to; Argon2 PHC strings carry their own salt, so the
/// implementation only uses it for logging.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, identifier: &str, password: &str) -> Result<String, PasswordError>;
    fn verify(&self, identifier: &str, hash: &str, password: &str)
        -> Result<bool, PasswordError>;
}

#[derive(Debug, Default, Clone)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, identifier: &str, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, identifier = %identifier, "argon2 hash_password error");
                PasswordError::HashingFailed(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    fn verify(
        &self,
        identifier: &str,
        hash: &str,
        password: &str,
    ) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, identifier = %identifier, "argon2 parse hash error");
            PasswordError::InvalidHashFormat
        })?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => {
                error!(error = %e, identifier = %identifier, "argon2 verify_password error");
                Err(PasswordError::VerificationFailed(e.to_string()))
            }
        }
    }
}
