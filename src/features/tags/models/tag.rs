use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for tag, with its published post count
#[derive(Debug, Clone, FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub post_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One `post_tags` link joined with the tag it points at
#[derive(Debug, Clone, FromRow)]
pub struct PostTag {
    pub post_id: i64,
    pub id: i64,
    pub name: String,
    pub slug: String,
}
