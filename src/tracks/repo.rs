use sqlx::PgPool;
use uuid::Uuid;

use crate::tracks::repo_types::Track;

pub async fn list(db: &PgPool) -> anyhow::Result<Vec<Track>> {
    let rows = sqlx::query_as::<_, Track>(
        r#"
        SELECT id, name, location, country, layout_version, turns, length_km
        FROM tracks
        ORDER BY name
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Track>> {
    let track = sqlx::query_as::<_, Track>(
        r#"
        SELECT id, name, location, country, layout_version, turns, length_km
        FROM tracks
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(track)
}

pub async fn insert(db: &PgPool, track: &Track) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO tracks (id, name, location, country, layout_version, turns, length_km)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(track.id)
    .bind(&track.name)
    .bind(&track.location)
    .bind(&track.country)
    .bind(&track.layout_version)
    .bind(track.turns)
    .bind(track.length_km)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn update(db: &PgPool, track: &Track) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE tracks
        SET name = $2, location = $3, country = $4, layout_version = $5,
            turns = $6, length_km = $7
        WHERE id = $1
        "#,
    )
    .bind(track.id)
    .bind(&track.name)
    .bind(&track.location)
    .bind(&track.country)
    .bind(&track.layout_version)
    .bind(track.turns)
    .bind(track.length_km)
    .execute(db)
    .await?;
    Ok(())
}

/// True if a row was removed.
pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM tracks WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Is there another row with the same (name, location, country)?
pub async fn exists_duplicate(
    db: &PgPool,
    exclude_id: Option<Uuid>,
    name: &str,
    location: &str,
    country: &str,
) -> anyhow::Result<bool> {
    let (exists,): (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM tracks
            WHERE name = $1 AND location = $2 AND country = $3
              AND ($4::uuid IS NULL OR id <> $4)
        )
        "#,
    )
    .bind(name)
    .bind(location)
    .bind(country)
    .bind(exclude_id)
    .fetch_one(db)
    .await?;
    Ok(exists)
}

/// Duplicate probe used by partial updates, widened to the layout version.
pub async fn exists_duplicate_layout(
    db: &PgPool,
    exclude_id: Option<Uuid>,
    name: &str,
    location: &str,
    country: &str,
    layout_version: &str,
) -> anyhow::Result<bool> {
    let (exists,): (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM tracks
            WHERE name = $1 AND location = $2 AND country = $3 AND layout_version = $4
              AND ($5::uuid IS NULL OR id <> $5)
        )
        "#,
    )
    .bind(name)
    .bind(location)
    .bind(country)
    .bind(layout_version)
    .bind(exclude_id)
    .fetch_one(db)
    .await?;
    Ok(exists)
}
