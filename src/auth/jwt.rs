use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::auth::error::AuthError;
use crate::auth::repo_types::User;
use crate::config::JwtConfig;

/// Claim set carried by every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub name: String,  // display name
    pub email: String,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}

/// Holds JWT signing and verification keys with config data.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::hours(cfg.ttl_hours),
        }
    }

    /// Issue a token for `user` with the configured TTL.
    pub fn sign(&self, user: &User) -> anyhow::Result<String> {
        self.sign_with_ttl(user, self.ttl)
    }

    pub fn sign_with_ttl(&self, user: &User, ttl: Duration) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + ttl;
        let claims = Claims {
            sub: user.id,
            name: user.display_name.clone(),
            email: user.email.clone(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user.id, "jwt signed");
        Ok(token)
    }

    /// Full verification: signature, expiry, issuer, audience.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data =
            decode::<Claims>(token, &self.decoding, &validation).map_err(map_jwt_error)?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }

    /// Claims without signature or expiry checks. Never an authorization
    /// input; used for diagnostics after a full verify has already failed.
    pub fn read_unverified(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();
        let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map_err(map_jwt_error)?;
        Ok(data.claims)
    }
}

fn map_jwt_error(e: jsonwebtoken::errors::Error) -> AuthError {
    match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidSignature => AuthError::BadSignature,
        ErrorKind::InvalidIssuer => AuthError::IssuerMismatch,
        ErrorKind::InvalidAudience => AuthError::AudienceMismatch,
        _ => AuthError::InvalidToken,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;

    fn make_keys(secret: &str, issuer: &str, audience: &str) -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_hours: 24,
        })
    }

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "alice".into(),
            display_name: "Alice".into(),
            email: "a@b.com".into(),
            created_at: OffsetDateTime::now_utc(),
            last_login_at: None,
            is_active: true,
            profile_picture_url: None,
            bio: None,
        }
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        let keys = make_keys("dev-secret", "test-issuer", "test-aud");
        let user = sample_user();
        let token = keys.sign(&user).expect("sign");
        let claims = keys.verify(&token).expect("verify token");
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.name, user.display_name);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn verify_rejects_expired_token() {
        let keys = make_keys("dev-secret", "iss", "aud");
        // two hours in the past clears the default 60s leeway
        let token = keys
            .sign_with_ttl(&sample_user(), Duration::hours(-2))
            .expect("sign");
        let err = keys.verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let signer = make_keys("secret-a", "iss", "aud");
        let checker = make_keys("secret-b", "iss", "aud");
        let token = signer.sign(&sample_user()).expect("sign");
        let err = checker.verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::BadSignature));
    }

    #[test]
    fn verify_rejects_wrong_issuer() {
        let signer = make_keys("same-secret", "good-iss", "aud");
        let checker = make_keys("same-secret", "other-iss", "aud");
        let token = signer.sign(&sample_user()).expect("sign");
        let err = checker.verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::IssuerMismatch));
    }

    #[test]
    fn verify_rejects_wrong_audience() {
        let signer = make_keys("same-secret", "iss", "good-aud");
        let checker = make_keys("same-secret", "iss", "other-aud");
        let token = signer.sign(&sample_user()).expect("sign");
        let err = checker.verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::AudienceMismatch));
    }

    #[test]
    fn verify_rejects_garbage() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let err = keys.verify("not-a-token").unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn read_unverified_survives_expiry_and_wrong_key() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let user = sample_user();
        let token = keys
            .sign_with_ttl(&user, Duration::hours(-2))
            .expect("sign");

        let other = make_keys("different-secret", "iss", "aud");
        let claims = other.read_unverified(&token).expect("unverified read");
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
    }
}
