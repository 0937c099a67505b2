use sqlx::PgPool;

use crate::core::database::{lock_tree, TreeLock};
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::comments::dtos::{
    CommentQueryParams, CommentResponseDto, CommentStatsDto, CommentTreeDto, CreateCommentDto,
    DeleteCommentResponseDto, PendingCommentDto,
};
use crate::features::comments::models::{Comment, CommentStats, CommentStatus, PendingComment};
use crate::features::comments::store::{refresh_comment_count, PgCommentStore};
use crate::features::posts::models::PostStatus;
use crate::features::settings::services::comment_moderation_enabled;
use crate::shared::types::PaginationQuery;
use crate::tree::{assemble_tree, CascadeRecursive, DeletionPolicy, TreeError};

const COMMENT_COLUMNS: &str = r#"
    id, post_id, parent_id, author_name, author_url, content, status, created_at, updated_at
"#;

/// Status a viewer is allowed to list. Only staff may look past approved.
fn visible_status(viewer: Option<&AuthenticatedUser>, requested: Option<CommentStatus>) -> CommentStatus {
    match viewer {
        Some(user) if user.has_editor_access() => requested.unwrap_or(CommentStatus::Approved),
        _ => CommentStatus::Approved,
    }
}

fn initial_status(moderated: bool) -> CommentStatus {
    if moderated {
        CommentStatus::Pending
    } else {
        CommentStatus::Approved
    }
}

/// Service for comment operations
pub struct CommentService {
    pool: PgPool,
}

impl CommentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One page of a post's comments, assembled into reply trees.
    /// Replies whose parent is not on the page are returned as roots.
    pub async fn list_for_post(
        &self,
        post_id: i64,
        params: &CommentQueryParams,
        viewer: Option<&AuthenticatedUser>,
    ) -> Result<(Vec<CommentTreeDto>, i64)> {
        let post_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;
        if !post_exists {
            return Err(AppError::NotFound(format!("Post with id {} not found", post_id)));
        }

        let status = visible_status(viewer, params.status);

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE post_id = $1 AND status = $2")
                .bind(post_id)
                .bind(status)
                .fetch_one(&self.pool)
                .await
                .map_err(AppError::Database)?;

        let comments = sqlx::query_as::<_, Comment>(&format!(
            r#"
            SELECT {}
            FROM comments
            WHERE post_id = $1 AND status = $2
            ORDER BY created_at ASC, id ASC
            LIMIT $3 OFFSET $4
            "#,
            COMMENT_COLUMNS
        ))
        .bind(post_id)
        .bind(status)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list comments for post {}: {:?}", post_id, e);
            AppError::Database(e)
        })?;

        let trees = assemble_tree(comments)
            .into_iter()
            .map(CommentTreeDto::from)
            .collect();

        Ok((trees, total))
    }

    /// Submit a comment. Held for moderation when `comment_moderation` is on.
    pub async fn create(
        &self,
        dto: CreateCommentDto,
        author_ip: Option<String>,
    ) -> Result<CommentResponseDto> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        lock_tree(&mut tx, TreeLock::Comments)
            .await
            .map_err(AppError::Database)?;

        let post_status: Option<PostStatus> =
            sqlx::query_scalar("SELECT status FROM posts WHERE id = $1 FOR SHARE")
                .bind(dto.post_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        if post_status != Some(PostStatus::Published) {
            return Err(AppError::NotFound(format!(
                "Post with id {} not found or not published",
                dto.post_id
            )));
        }

        if let Some(parent_id) = dto.parent_id {
            let parent_post: Option<i64> =
                sqlx::query_scalar("SELECT post_id FROM comments WHERE id = $1")
                    .bind(parent_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(AppError::Database)?;
            match parent_post {
                None => return Err(TreeError::ParentNotFound(parent_id).into()),
                Some(post_id) if post_id != dto.post_id => {
                    return Err(AppError::BadRequest(format!(
                        "Comment {} belongs to a different post",
                        parent_id
                    )));
                }
                Some(_) => {}
            }
        }

        let moderated = comment_moderation_enabled(&mut *tx).await?;

        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            INSERT INTO comments
                (post_id, parent_id, author_name, author_email, author_url, content, author_ip, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        ))
        .bind(dto.post_id)
        .bind(dto.parent_id)
        .bind(&dto.author_name)
        .bind(&dto.author_email)
        .bind(&dto.author_url)
        .bind(&dto.content)
        .bind(&author_ip)
        .bind(initial_status(moderated))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_db(e, "Comment already exists"))?;

        refresh_comment_count(&mut tx, comment.post_id)
            .await
            .map_err(AppError::Database)?;
        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!(
            "Comment {} on post {} created as {:?}",
            comment.id,
            comment.post_id,
            comment.status
        );
        Ok(CommentResponseDto::from(comment))
    }

    /// Change a comment's status and recount the post's approved comments
    pub async fn update_status(&self, id: i64, status: CommentStatus) -> Result<CommentResponseDto> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        // Recounts run under the same lock as cascade deletes.
        lock_tree(&mut tx, TreeLock::Comments)
            .await
            .map_err(AppError::Database)?;

        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            UPDATE comments
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound(format!("Comment with id {} not found", id)))?;

        refresh_comment_count(&mut tx, comment.post_id)
            .await
            .map_err(AppError::Database)?;
        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Comment {} marked {:?}", id, status);
        Ok(CommentResponseDto::from(comment))
    }

    /// Delete a comment with every reply below it, atomically
    pub async fn delete(&self, id: i64) -> Result<DeleteCommentResponseDto> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        lock_tree(&mut tx, TreeLock::Comments)
            .await
            .map_err(AppError::Database)?;

        let outcome = CascadeRecursive
            .delete(&mut PgCommentStore::new(&mut tx), id)
            .await?;

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Comment {} deleted, {} rows removed", id, outcome.removed.len());
        Ok(DeleteCommentResponseDto::from(outcome))
    }

    /// Moderation queue, newest first
    pub async fn pending(&self, params: &PaginationQuery) -> Result<(Vec<PendingCommentDto>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE status = 'pending'")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let comments = sqlx::query_as::<_, PendingComment>(
            r#"
            SELECT c.id, c.post_id, c.parent_id, c.author_name, c.author_email, c.author_url,
                   c.content, c.author_ip, c.created_at,
                   p.title AS post_title, p.slug AS post_slug
            FROM comments c
            JOIN posts p ON p.id = c.post_id
            WHERE c.status = 'pending'
            ORDER BY c.created_at DESC, c.id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok((comments.into_iter().map(PendingCommentDto::from).collect(), total))
    }

    /// Comment counts per status
    pub async fn stats(&self) -> Result<CommentStatsDto> {
        let stats = sqlx::query_as::<_, CommentStats>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                   COUNT(*) FILTER (WHERE status = 'approved') AS approved,
                   COUNT(*) FILTER (WHERE status = 'spam') AS spam,
                   COUNT(*) FILTER (WHERE status = 'rejected') AS rejected
            FROM comments
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(CommentStatsDto::from(stats))
    }
}
