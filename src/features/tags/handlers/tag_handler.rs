use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::{RequireAdmin, RequireEditor};
use crate::features::tags::dtos::{
    CreateTagDto, PopularTagsQuery, TagQueryParams, TagResponseDto, UpdateTagDto,
};
use crate::features::tags::services::TagService;
use crate::shared::types::{ApiResponse, Meta};

/// List tags
///
/// Ordered by the number of published posts using each tag.
#[utoipa::path(
    get,
    path = "/api/tags",
    params(TagQueryParams),
    responses(
        (status = 200, description = "Tags", body = ApiResponse<Vec<TagResponseDto>>),
    ),
    tag = "tags"
)]
pub async fn list_tags(
    State(service): State<Arc<TagService>>,
    Query(params): Query<TagQueryParams>,
) -> Result<Json<ApiResponse<Vec<TagResponseDto>>>> {
    let (tags, total) = service.list(&params).await?;
    Ok(Json(ApiResponse::success(
        Some(tags),
        None,
        Some(Meta { total }),
    )))
}

/// Popular tags
#[utoipa::path(
    get,
    path = "/api/tags/popular",
    params(PopularTagsQuery),
    responses(
        (status = 200, description = "Tags used by published posts", body = ApiResponse<Vec<TagResponseDto>>),
    ),
    tag = "tags"
)]
pub async fn popular_tags(
    State(service): State<Arc<TagService>>,
    Query(query): Query<PopularTagsQuery>,
) -> Result<Json<ApiResponse<Vec<TagResponseDto>>>> {
    let tags = service.popular(&query).await?;
    Ok(Json(ApiResponse::success(Some(tags), None, None)))
}

/// Get tag by slug
#[utoipa::path(
    get,
    path = "/api/tags/{slug}",
    params(
        ("slug" = String, Path, description = "Tag slug")
    ),
    responses(
        (status = 200, description = "Tag found", body = ApiResponse<TagResponseDto>),
        (status = 404, description = "Tag not found")
    ),
    tag = "tags"
)]
pub async fn get_tag(
    State(service): State<Arc<TagService>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<TagResponseDto>>> {
    let tag = service.get_by_slug(&slug).await?;
    Ok(Json(ApiResponse::success(Some(tag), None, None)))
}

/// Create a tag (editor or admin)
#[utoipa::path(
    post,
    path = "/api/admin/tags",
    request_body = CreateTagDto,
    responses(
        (status = 200, description = "Tag created successfully", body = ApiResponse<TagResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - editor access required"),
        (status = 409, description = "Slug already taken")
    ),
    tag = "tags",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_tag(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<TagService>>,
    AppJson(dto): AppJson<CreateTagDto>,
) -> Result<Json<ApiResponse<TagResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let tag = service.create(dto).await?;
    Ok(Json(ApiResponse::success(
        Some(tag),
        Some("Tag created successfully".to_string()),
        None,
    )))
}

/// Update a tag (editor or admin)
#[utoipa::path(
    put,
    path = "/api/admin/tags/{id}",
    params(
        ("id" = i64, Path, description = "Tag ID")
    ),
    request_body = UpdateTagDto,
    responses(
        (status = 200, description = "Tag updated successfully", body = ApiResponse<TagResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Tag not found"),
        (status = 403, description = "Forbidden - editor access required"),
        (status = 409, description = "Slug already taken")
    ),
    tag = "tags",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_tag(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<TagService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdateTagDto>,
) -> Result<Json<ApiResponse<TagResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let tag = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(tag), None, None)))
}

/// Delete a tag (admin only)
#[utoipa::path(
    delete,
    path = "/api/admin/tags/{id}",
    params(
        ("id" = i64, Path, description = "Tag ID")
    ),
    responses(
        (status = 200, description = "Tag deleted successfully"),
        (status = 404, description = "Tag not found"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "tags",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_tag(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<TagService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Tag deleted successfully".to_string()),
        None,
    )))
}
