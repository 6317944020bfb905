use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Circuit row. Nothing here is sensitive, so columns stay plaintext;
/// uniqueness of (name, location, country) is a business rule checked by the
/// handlers, not a database constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Track {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub country: String,
    pub layout_version: String,
    pub turns: Option<i32>,
    pub length_km: Option<f64>,
}
