use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::settings::models::Setting;
use crate::shared::validation::SETTING_KEY_REGEX;

/// Response DTO for a setting
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SettingResponseDto {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<Setting> for SettingResponseDto {
    fn from(s: Setting) -> Self {
        Self {
            key: s.setting_key,
            value: s.setting_value,
            description: s.description,
            updated_at: s.updated_at,
        }
    }
}

/// Public settings as key -> value
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(transparent)]
pub struct PublicSettingsDto(pub BTreeMap<String, String>);

/// Request DTO for saving settings
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateSettingsDto {
    /// Setting key -> new value. Unknown keys are created.
    #[validate(length(min = 1, message = "At least one setting is required"))]
    pub settings: BTreeMap<String, String>,
}

impl UpdateSettingsDto {
    /// Rejects keys that are not lowercase snake_case.
    pub fn check_keys(&self) -> Result<()> {
        let invalid: Vec<&str> = self
            .settings
            .keys()
            .filter(|k| k.len() > 100 || !SETTING_KEY_REGEX.is_match(k))
            .map(String::as_str)
            .collect();

        if !invalid.is_empty() {
            return Err(AppError::Validation(format!(
                "Invalid setting keys: {}",
                invalid.join(", ")
            )));
        }
        Ok(())
    }
}
