use sqlx::{PgExecutor, PgPool};

use crate::core::error::{AppError, Result};
use crate::features::settings::dtos::{PublicSettingsDto, SettingResponseDto, UpdateSettingsDto};
use crate::features::settings::models::Setting;
use crate::shared::constants::{PUBLIC_SETTING_KEYS, SETTING_COMMENT_MODERATION};

/// Reads one setting value, `None` when the key is not stored.
async fn setting_value<'e>(executor: impl PgExecutor<'e>, key: &str) -> Result<Option<String>> {
    sqlx::query_scalar("SELECT setting_value FROM settings WHERE setting_key = $1")
        .bind(key)
        .fetch_optional(executor)
        .await
        .map_err(AppError::Database)
}

/// Moderation stays on unless the setting is stored with a value other than "1".
fn moderation_from(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim() == "1")
}

/// Whether new comments should wait for approval
pub async fn comment_moderation_enabled<'e>(executor: impl PgExecutor<'e>) -> Result<bool> {
    let value = setting_value(executor, SETTING_COMMENT_MODERATION).await?;
    Ok(moderation_from(value.as_deref()))
}

/// Service for site settings
pub struct SettingService {
    pool: PgPool,
}

impl SettingService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Public settings as key -> value
    pub async fn public(&self) -> Result<PublicSettingsDto> {
        let keys: Vec<String> = PUBLIC_SETTING_KEYS.iter().map(|k| k.to_string()).collect();

        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT setting_key, setting_value FROM settings WHERE setting_key = ANY($1)",
        )
        .bind(&keys)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(PublicSettingsDto(rows.into_iter().collect()))
    }

    /// Every stored setting, ordered by key
    pub async fn list_all(&self) -> Result<Vec<SettingResponseDto>> {
        let settings = sqlx::query_as::<_, Setting>(
            r#"
            SELECT setting_key, setting_value, description, updated_at
            FROM settings
            ORDER BY setting_key
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(settings.into_iter().map(SettingResponseDto::from).collect())
    }

    /// Insert or update every pair, all or nothing
    pub async fn upsert(&self, dto: UpdateSettingsDto) -> Result<Vec<SettingResponseDto>> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        for (key, value) in &dto.settings {
            sqlx::query(
                r#"
                INSERT INTO settings (setting_key, setting_value)
                VALUES ($1, $2)
                ON CONFLICT (setting_key)
                DO UPDATE SET setting_value = EXCLUDED.setting_value, updated_at = NOW()
                "#,
            )
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        tracing::info!("Saved {} settings", dto.settings.len());

        self.list_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moderation_flag() {
        assert!(moderation_from(None));
        assert!(moderation_from(Some("1")));
        assert!(moderation_from(Some(" 1 ")));
        assert!(!moderation_from(Some("0")));
        assert!(!moderation_from(Some("")));
    }
}
