use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for uploaded media
#[derive(Debug, FromRow)]
pub struct File {
    pub id: Uuid,
    pub file_key: String,
    pub original_filename: String,
    pub content_type: String,
    pub file_size: i64,
    pub url: String,
    pub folder: String,
    pub uploaded_by: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
