use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::comments::models::{Comment, CommentStats, CommentStatus, PendingComment};
use crate::shared::constants::{DEFAULT_COMMENT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::shared::types::page_offset;
use crate::tree::{DeleteOutcome, Tree};

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_COMMENT_PAGE_SIZE
}

/// Query params for listing a post's comments
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct CommentQueryParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    /// Items per page (default: 20, max: 100)
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,

    /// Status filter, honored for editors and admins only
    pub status: Option<CommentStatus>,
}

impl CommentQueryParams {
    pub fn offset(&self) -> i64 {
        page_offset(self.page, self.limit())
    }

    pub fn limit(&self) -> i64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

/// Request DTO for submitting a comment
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCommentDto {
    #[validate(range(min = 1, message = "post_id must be positive"))]
    pub post_id: i64,

    /// Comment being replied to; must belong to the same post
    #[validate(range(min = 1, message = "parent_id must be positive"))]
    pub parent_id: Option<i64>,

    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub author_name: String,

    #[validate(email(message = "Invalid email address"))]
    pub author_email: String,

    #[validate(url(message = "Invalid URL"))]
    pub author_url: Option<String>,

    #[validate(length(min = 1, max = 1000, message = "Content must be 1-1000 characters"))]
    pub content: String,
}

/// Request DTO for moderating a comment
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateCommentStatusDto {
    pub status: CommentStatus,
}

/// Response DTO for a comment
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommentResponseDto {
    pub id: i64,
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub author_name: String,
    pub author_url: Option<String>,
    pub content: String,
    pub status: CommentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponseDto {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            post_id: c.post_id,
            parent_id: c.parent_id,
            author_name: c.author_name,
            author_url: c.author_url,
            content: c.content,
            status: c.status,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Comment with its replies
#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(no_recursion)]
pub struct CommentTreeDto {
    #[serde(flatten)]
    pub comment: CommentResponseDto,
    pub replies: Vec<CommentTreeDto>,
}

impl From<Tree<Comment>> for CommentTreeDto {
    fn from(tree: Tree<Comment>) -> Self {
        Self {
            comment: CommentResponseDto::from(tree.node),
            replies: tree.children.into_iter().map(Self::from).collect(),
        }
    }
}

/// Moderation queue entry
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PendingCommentDto {
    pub id: i64,
    pub post_id: i64,
    pub post_title: String,
    pub post_slug: String,
    pub parent_id: Option<i64>,
    pub author_name: String,
    pub author_email: String,
    pub author_url: Option<String>,
    pub author_ip: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<PendingComment> for PendingCommentDto {
    fn from(c: PendingComment) -> Self {
        Self {
            id: c.id,
            post_id: c.post_id,
            post_title: c.post_title,
            post_slug: c.post_slug,
            parent_id: c.parent_id,
            author_name: c.author_name,
            author_email: c.author_email,
            author_url: c.author_url,
            author_ip: c.author_ip,
            content: c.content,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommentStatsDto {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub spam: i64,
    pub rejected: i64,
}

impl From<CommentStats> for CommentStatsDto {
    fn from(s: CommentStats) -> Self {
        Self {
            total: s.total,
            pending: s.pending,
            approved: s.approved,
            spam: s.spam,
            rejected: s.rejected,
        }
    }
}

/// Result of a comment delete
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeleteCommentResponseDto {
    /// Removed comment ids, deepest reply first. Empty when nothing existed.
    pub removed: Vec<i64>,
}

impl From<DeleteOutcome> for DeleteCommentResponseDto {
    fn from(outcome: DeleteOutcome) -> Self {
        Self {
            removed: outcome.removed,
        }
    }
}
