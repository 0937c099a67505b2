use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::{RequireAdmin, RequireEditor};
use crate::features::posts::dtos::{
    CreatePostDto, PostQueryParams, PostResponseDto, PostSummaryDto, UpdatePostDto,
};
use crate::features::posts::services::PostService;
use crate::shared::types::{ApiResponse, Meta};

/// List published posts
#[utoipa::path(
    get,
    path = "/api/posts",
    params(PostQueryParams),
    responses(
        (status = 200, description = "Published posts, newest first", body = ApiResponse<Vec<PostSummaryDto>>),
    ),
    tag = "posts"
)]
pub async fn list_posts(
    State(service): State<Arc<PostService>>,
    Query(params): Query<PostQueryParams>,
) -> Result<Json<ApiResponse<Vec<PostSummaryDto>>>> {
    let (posts, total) = service.list_published(&params).await?;
    Ok(Json(ApiResponse::success(
        Some(posts),
        None,
        Some(Meta { total }),
    )))
}

/// Get a published post by slug
#[utoipa::path(
    get,
    path = "/api/posts/{slug}",
    params(
        ("slug" = String, Path, description = "Post slug")
    ),
    responses(
        (status = 200, description = "Post found", body = ApiResponse<PostResponseDto>),
        (status = 404, description = "Post not found")
    ),
    tag = "posts"
)]
pub async fn get_post(
    State(service): State<Arc<PostService>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<PostResponseDto>>> {
    let post = service.get_published_by_slug(&slug).await?;
    Ok(Json(ApiResponse::success(Some(post), None, None)))
}

/// Create a post (editor or admin)
#[utoipa::path(
    post,
    path = "/api/admin/posts",
    request_body = CreatePostDto,
    responses(
        (status = 200, description = "Post created successfully", body = ApiResponse<PostResponseDto>),
        (status = 400, description = "Validation error or unknown category"),
        (status = 403, description = "Forbidden - editor access required"),
        (status = 409, description = "Slug already taken")
    ),
    tag = "posts",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_post(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<PostService>>,
    AppJson(dto): AppJson<CreatePostDto>,
) -> Result<Json<ApiResponse<PostResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let post = service.create(dto).await?;
    Ok(Json(ApiResponse::success(
        Some(post),
        Some("Post created successfully".to_string()),
        None,
    )))
}

/// Update a post (editor or admin)
#[utoipa::path(
    put,
    path = "/api/admin/posts/{id}",
    params(
        ("id" = i64, Path, description = "Post ID")
    ),
    request_body = UpdatePostDto,
    responses(
        (status = 200, description = "Post updated successfully", body = ApiResponse<PostResponseDto>),
        (status = 400, description = "Validation error or unknown category"),
        (status = 404, description = "Post not found"),
        (status = 403, description = "Forbidden - editor access required"),
        (status = 409, description = "Slug already taken")
    ),
    tag = "posts",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_post(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<PostService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdatePostDto>,
) -> Result<Json<ApiResponse<PostResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let post = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(post), None, None)))
}

/// Delete a post and its comments (admin only)
#[utoipa::path(
    delete,
    path = "/api/admin/posts/{id}",
    params(
        ("id" = i64, Path, description = "Post ID")
    ),
    responses(
        (status = 200, description = "Post deleted successfully"),
        (status = 404, description = "Post not found"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "posts",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_post(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<PostService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Post deleted successfully".to_string()),
        None,
    )))
}
