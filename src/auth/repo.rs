use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::EncryptedUser;

/// Persistence boundary for account rows. Email lookups match on ciphertext,
/// which works because field encryption is deterministic.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_encrypted_email(
        &self,
        encrypted_email: &str,
    ) -> anyhow::Result<Option<EncryptedUser>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<EncryptedUser>>;
    async fn insert(&self, user: &EncryptedUser) -> anyhow::Result<()>;
    async fn update(&self, user: &EncryptedUser) -> anyhow::Result<()>;
}

pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_encrypted_email(
        &self,
        encrypted_email: &str,
    ) -> anyhow::Result<Option<EncryptedUser>> {
        let user = sqlx::query_as::<_, EncryptedUser>(
            r#"
            SELECT id, encrypted_name, encrypted_display_name, encrypted_email,
                   created_at, last_login_at, is_active,
                   encrypted_profile_picture_url, encrypted_bio, password_hash
            FROM users
            WHERE encrypted_email = $1
            "#,
        )
        .bind(encrypted_email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<EncryptedUser>> {
        let user = sqlx::query_as::<_, EncryptedUser>(
            r#"
            SELECT id, encrypted_name, encrypted_display_name, encrypted_email,
                   created_at, last_login_at, is_active,
                   encrypted_profile_picture_url, encrypted_bio, password_hash
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn insert(&self, user: &EncryptedUser) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, encrypted_name, encrypted_display_name, encrypted_email,
                               created_at, last_login_at, is_active,
                               encrypted_profile_picture_url, encrypted_bio, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(user.id)
        .bind(&user.encrypted_name)
        .bind(&user.encrypted_display_name)
        .bind(&user.encrypted_email)
        .bind(user.created_at)
        .bind(user.last_login_at)
        .bind(user.is_active)
        .bind(&user.encrypted_profile_picture_url)
        .bind(&user.encrypted_bio)
        .bind(&user.password_hash)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn update(&self, user: &EncryptedUser) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET encrypted_name = $2, encrypted_display_name = $3, encrypted_email = $4,
                last_login_at = $5, is_active = $6,
                encrypted_profile_picture_url = $7, encrypted_bio = $8, password_hash = $9
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.encrypted_name)
        .bind(&user.encrypted_display_name)
        .bind(&user.encrypted_email)
        .bind(user.last_login_at)
        .bind(user.is_active)
        .bind(&user.encrypted_profile_picture_url)
        .bind(&user.encrypted_bio)
        .bind(&user.password_hash)
        .execute(&self.db)
        .await?;
        Ok(())
    }
}
