use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::crypto::FieldCipher;
use crate::auth::error::AuthError;
use crate::auth::jwt::JwtKeys;
use crate::auth::password::CredentialHasher;
use crate::auth::repo::UserStore;
use crate::auth::repo_types::User;

/// Orchestrates login, registration and current-user resolution over the
/// cipher, hasher, token keys and user store.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    cipher: Arc<FieldCipher>,
    hasher: Arc<dyn CredentialHasher>,
    jwt: JwtKeys,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn UserStore>,
        cipher: Arc<FieldCipher>,
        hasher: Arc<dyn CredentialHasher>,
        jwt: JwtKeys,
    ) -> Self {
        Self {
            store,
            cipher,
            hasher,
            jwt,
        }
    }

    pub fn jwt(&self) -> &JwtKeys {
        &self.jwt
    }

    /// Authenticate and issue a token. The outward failure is the same for
    /// an unknown email and a wrong password.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let email = normalize_email(email);
        let encrypted_email = self.cipher.encrypt(&email);

        let record = self
            .store
            .find_by_encrypted_email(&encrypted_email)
            .await
            .map_err(AuthError::Storage)?;
        let Some(mut record) = record else {
            warn!("login rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(&email, &record.password_hash, password)? {
            warn!(user_id = %record.id, "login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let user = record.decrypt(&self.cipher)?;
        let token = self.jwt.sign(&user).map_err(AuthError::Signing)?;

        // The token is already issued; a failed timestamp write must not
        // turn into a login failure.
        record.last_login_at = Some(OffsetDateTime::now_utc());
        if let Err(e) = self.store.update(&record).await {
            warn!(error = %e, user_id = %record.id, "failed to persist last_login_at; continuing");
        }

        info!(user_id = %record.id, "user logged in");
        Ok(token)
    }

    /// Create an account. Email uniqueness is checked against the ciphertext
    /// column, so it is exact after normalization.
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let email = normalize_email(email);
        let encrypted_email = self.cipher.encrypt(&email);

        if self
            .store
            .find_by_encrypted_email(&encrypted_email)
            .await
            .map_err(AuthError::Storage)?
            .is_some()
        {
            warn!("registration rejected: email already taken");
            return Err(AuthError::UserAlreadyExists);
        }

        let user = User {
            id: Uuid::new_v4(),
            name: username.to_lowercase(),
            display_name: username.to_string(),
            email,
            created_at: OffsetDateTime::now_utc(),
            last_login_at: None,
            is_active: true,
            profile_picture_url: None,
            bio: None,
        };

        let mut record = user.encrypt(&self.cipher);
        record.password_hash = self.hasher.hash(&user.email, password)?;
        self.store.insert(&record).await.map_err(AuthError::Storage)?;

        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Resolve the account behind a presented token. Claims are only trusted
    /// after a full verify; on failure the unverified subject is still
    /// useful in the logs.
    pub async fn current_user(&self, token: Option<&str>) -> Result<User, AuthError> {
        let token = match token {
            Some(t) if !t.trim().is_empty() => t,
            _ => return Err(AuthError::MissingToken),
        };

        let claims = match self.jwt.verify(token) {
            Ok(claims) => claims,
            Err(e) => {
                if let Ok(unverified) = self.jwt.read_unverified(token) {
                    debug!(user_id = %unverified.sub, "rejected token subject");
                }
                return Err(e);
            }
        };

        let record = self
            .store
            .find_by_id(claims.sub)
            .await
            .map_err(AuthError::Storage)?
            .ok_or(AuthError::UserNotFound)?;

        Ok(record.decrypt(&self.cipher)?)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
