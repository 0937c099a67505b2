use std::sync::Arc;

use axum::{extract::State, Json};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::settings::dtos::{PublicSettingsDto, SettingResponseDto, UpdateSettingsDto};
use crate::features::settings::services::SettingService;
use crate::shared::types::ApiResponse;

/// Get public site settings
#[utoipa::path(
    get,
    path = "/api/settings",
    responses(
        (status = 200, description = "Public settings", body = ApiResponse<PublicSettingsDto>),
    ),
    tag = "settings"
)]
pub async fn get_public_settings(
    State(service): State<Arc<SettingService>>,
) -> Result<Json<ApiResponse<PublicSettingsDto>>> {
    let settings = service.public().await?;
    Ok(Json(ApiResponse::success(Some(settings), None, None)))
}

/// List every setting (admin only)
#[utoipa::path(
    get,
    path = "/api/admin/settings",
    responses(
        (status = 200, description = "All settings", body = ApiResponse<Vec<SettingResponseDto>>),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "settings",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_settings(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<SettingService>>,
) -> Result<Json<ApiResponse<Vec<SettingResponseDto>>>> {
    let settings = service.list_all().await?;
    Ok(Json(ApiResponse::success(Some(settings), None, None)))
}

/// Save settings (admin only)
#[utoipa::path(
    put,
    path = "/api/admin/settings",
    request_body = UpdateSettingsDto,
    responses(
        (status = 200, description = "Settings saved", body = ApiResponse<Vec<SettingResponseDto>>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "settings",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_settings(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<SettingService>>,
    AppJson(dto): AppJson<UpdateSettingsDto>,
) -> Result<Json<ApiResponse<Vec<SettingResponseDto>>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    dto.check_keys()?;

    let settings = service.upsert(dto).await?;
    Ok(Json(ApiResponse::success(
        Some(settings),
        Some("Settings saved".to_string()),
        None,
    )))
}
