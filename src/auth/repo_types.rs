use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::crypto::{CryptoError, FieldCipher};

/// Plaintext view of an account. Only ever lives in memory; persistence goes
/// through [`EncryptedUser`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,         // lowercase handle
    pub display_name: String, // username as entered
    pub email: String,        // normalized to lowercase
    pub created_at: OffsetDateTime,
    pub last_login_at: Option<OffsetDateTime>,
    pub is_active: bool,
    pub profile_picture_url: Option<String>,
    pub bio: Option<String>,
}

/// At-rest row shape: PII columns hold base64 ciphertext, metadata stays
/// plain so it remains queryable.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EncryptedUser {
    pub id: Uuid,
    pub encrypted_name: String,
    pub encrypted_display_name: String,
    pub encrypted_email: String,
    pub created_at: OffsetDateTime,
    pub last_login_at: Option<OffsetDateTime>,
    pub is_active: bool,
    pub encrypted_profile_picture_url: Option<String>,
    pub encrypted_bio: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
}

impl User {
    /// Encrypt every PII field for storage. The password hash is not derived
    /// from the plaintext user; the caller fills it in separately.
    pub fn encrypt(&self, cipher: &FieldCipher) -> EncryptedUser {
        EncryptedUser {
            id: self.id,
            encrypted_name: cipher.encrypt(&self.name),
            encrypted_display_name: cipher.encrypt(&self.display_name),
            encrypted_email: cipher.encrypt(&self.email),
            created_at: self.created_at,
            last_login_at: self.last_login_at,
            is_active: self.is_active,
            encrypted_profile_picture_url: self
                .profile_picture_url
                .as_deref()
                .map(|v| cipher.encrypt(v)),
            encrypted_bio: self.bio.as_deref().map(|v| cipher.encrypt(v)),
            password_hash: String::new(),
        }
    }
}

impl EncryptedUser {
    /// Inverse of [`User::encrypt`]; optional fields stay absent.
    pub fn decrypt(&self, cipher: &FieldCipher) -> Result<User, CryptoError> {
        Ok(User {
            id: self.id,
            name: cipher.decrypt(&self.encrypted_name)?,
            display_name: cipher.decrypt(&self.encrypted_display_name)?,
            email: cipher.decrypt(&self.encrypted_email)?,
            created_at: self.created_at,
            last_login_at: self.last_login_at,
            is_active: self.is_active,
            profile_picture_url: self
                .encrypted_profile_picture_url
                .as_deref()
                .map(|v| cipher.decrypt(v))
                .transpose()?,
            bio: self
                .encrypted_bio
                .as_deref()
                .map(|v| cipher.decrypt(v))
                .transpose()?,
        })
    }
}
