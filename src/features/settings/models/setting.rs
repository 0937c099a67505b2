use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for setting
#[derive(Debug, Clone, FromRow)]
pub struct Setting {
    pub setting_key: String,
    pub setting_value: String,
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
}
