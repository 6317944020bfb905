use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_hours: i64,
}

/// Key material for field-level encryption, kept in the base64 form the
/// environment supplies it in; decoding and length checks happen when the
/// cipher is built at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct EncryptionConfig {
    pub key_b64: String,
    pub iv_b64: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub encryption: EncryptionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "racedash".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "racedash-users".into()),
            ttl_hours: std::env::var("JWT_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(24),
        };
        let encryption = EncryptionConfig {
            key_b64: std::env::var("ENCRYPTION_KEY").context("ENCRYPTION_KEY must be set")?,
            iv_b64: std::env::var("ENCRYPTION_IV").context("ENCRYPTION_IV must be set")?,
        };
        Ok(Self {
            database_url,
            jwt,
            encryption,
        })
    }
}
