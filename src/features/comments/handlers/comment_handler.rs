use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, ClientIp};
use crate::features::auth::guards::{RequireAdmin, RequireEditor};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::comments::dtos::{
    CommentQueryParams, CommentResponseDto, CommentStatsDto, CommentTreeDto, CreateCommentDto,
    DeleteCommentResponseDto, PendingCommentDto, UpdateCommentStatusDto,
};
use crate::features::comments::models::CommentStatus;
use crate::features::comments::services::CommentService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// List a post's comments as reply trees
///
/// Anonymous visitors see approved comments only. Editors and admins may
/// pass `status` to look at other states.
#[utoipa::path(
    get,
    path = "/api/comments/post/{post_id}",
    params(
        ("post_id" = i64, Path, description = "Post ID"),
        CommentQueryParams
    ),
    responses(
        (status = 200, description = "Comment trees for one page", body = ApiResponse<Vec<CommentTreeDto>>),
        (status = 401, description = "Invalid token"),
        (status = 404, description = "Post not found")
    ),
    tag = "comments",
    security(
        (),
        ("bearer_auth" = [])
    )
)]
pub async fn list_comments(
    viewer: Option<AuthenticatedUser>,
    State(service): State<Arc<CommentService>>,
    Path(post_id): Path<i64>,
    Query(params): Query<CommentQueryParams>,
) -> Result<Json<ApiResponse<Vec<CommentTreeDto>>>> {
    let (comments, total) = service
        .list_for_post(post_id, &params, viewer.as_ref())
        .await?;
    Ok(Json(ApiResponse::success(
        Some(comments),
        None,
        Some(Meta { total }),
    )))
}

/// Submit a comment or a reply
#[utoipa::path(
    post,
    path = "/api/comments",
    request_body = CreateCommentDto,
    responses(
        (status = 200, description = "Comment submitted", body = ApiResponse<CommentResponseDto>),
        (status = 400, description = "Validation error or invalid parent"),
        (status = 404, description = "Post not found or not published")
    ),
    tag = "comments"
)]
pub async fn create_comment(
    State(service): State<Arc<CommentService>>,
    ClientIp(ip): ClientIp,
    AppJson(dto): AppJson<CreateCommentDto>,
) -> Result<Json<ApiResponse<CommentResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let comment = service.create(dto, ip).await?;
    let message = match comment.status {
        CommentStatus::Pending => "Comment submitted and awaiting moderation",
        _ => "Comment published",
    };
    Ok(Json(ApiResponse::success(
        Some(comment),
        Some(message.to_string()),
        None,
    )))
}

/// Pending comments, newest first (editor or admin)
#[utoipa::path(
    get,
    path = "/api/admin/comments/pending",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Moderation queue", body = ApiResponse<Vec<PendingCommentDto>>),
        (status = 403, description = "Forbidden - editor access required")
    ),
    tag = "comments",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_pending_comments(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<CommentService>>,
    Query(params): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<PendingCommentDto>>>> {
    let (comments, total) = service.pending(&params).await?;
    Ok(Json(ApiResponse::success(
        Some(comments),
        None,
        Some(Meta { total }),
    )))
}

/// Comment counts per status (editor or admin)
#[utoipa::path(
    get,
    path = "/api/admin/comments/stats",
    responses(
        (status = 200, description = "Comment statistics", body = ApiResponse<CommentStatsDto>),
        (status = 403, description = "Forbidden - editor access required")
    ),
    tag = "comments",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn comment_stats(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<CommentService>>,
) -> Result<Json<ApiResponse<CommentStatsDto>>> {
    let stats = service.stats().await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}

/// Approve, reject or flag a comment (editor or admin)
#[utoipa::path(
    put,
    path = "/api/admin/comments/{id}/status",
    params(
        ("id" = i64, Path, description = "Comment ID")
    ),
    request_body = UpdateCommentStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<CommentResponseDto>),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Comment not found"),
        (status = 403, description = "Forbidden - editor access required")
    ),
    tag = "comments",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_comment_status(
    RequireEditor(user): RequireEditor,
    State(service): State<Arc<CommentService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdateCommentStatusDto>,
) -> Result<Json<ApiResponse<CommentResponseDto>>> {
    tracing::debug!("{} sets comment {} to {:?}", user.sub, id, dto.status);
    let comment = service.update_status(id, dto.status).await?;
    Ok(Json(ApiResponse::success(
        Some(comment),
        Some("Comment status updated".to_string()),
        None,
    )))
}

/// Delete a comment and all replies below it (admin only)
#[utoipa::path(
    delete,
    path = "/api/admin/comments/{id}",
    params(
        ("id" = i64, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Comment thread deleted", body = ApiResponse<DeleteCommentResponseDto>),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "comments",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_comment(
    RequireAdmin(user): RequireAdmin,
    State(service): State<Arc<CommentService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<DeleteCommentResponseDto>>> {
    tracing::debug!("{} deletes comment {}", user.sub, id);
    let outcome = service.delete(id).await?;
    Ok(Json(ApiResponse::success(Some(outcome), None, None)))
}
