use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::posts::models::{Post, PostStatus, PostSummary};
use crate::features::tags::dtos::TagSummaryDto;
use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::shared::types::{nullable, page_offset};

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// Query params for listing published posts
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PostQueryParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    /// Items per page
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,

    /// Only posts in the category with this slug
    pub category: Option<String>,

    /// Case-insensitive match on title or content
    pub search: Option<String>,
}

impl PostQueryParams {
    pub fn offset(&self) -> i64 {
        page_offset(self.page, self.limit())
    }

    pub fn limit(&self) -> i64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

/// Request DTO for creating a post
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePostDto {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: String,

    #[validate(length(max = 500, message = "Excerpt must not exceed 500 characters"))]
    pub excerpt: Option<String>,

    #[serde(default)]
    pub status: PostStatus,

    #[validate(range(min = 1, message = "category_id must be positive"))]
    pub category_id: Option<i64>,

    /// Tag ids to attach
    #[serde(default)]
    pub tags: Vec<i64>,
}

/// Request DTO for updating a post. Absent fields stay unchanged;
/// `category_id: null` removes the category and `excerpt: null` clears it.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePostDto {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: Option<String>,

    #[validate(length(max = 500, message = "Excerpt must not exceed 500 characters"))]
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub excerpt: Option<Option<String>>,

    pub status: Option<PostStatus>,

    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<i64>)]
    pub category_id: Option<Option<i64>>,

    /// Replaces the whole tag set when present
    pub tags: Option<Vec<i64>>,
}

/// Response DTO for a single post
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PostResponseDto {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub status: PostStatus,
    pub category_id: Option<i64>,
    pub comment_count: i32,
    pub view_count: i32,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tags: Vec<TagSummaryDto>,
}

impl PostResponseDto {
    pub fn with_tags(p: Post, tags: Vec<TagSummaryDto>) -> Self {
        Self {
            id: p.id,
            title: p.title,
            slug: p.slug,
            excerpt: p.excerpt,
            content: p.content,
            status: p.status,
            category_id: p.category_id,
            comment_count: p.comment_count,
            view_count: p.view_count,
            published_at: p.published_at,
            created_at: p.created_at,
            updated_at: p.updated_at,
            tags,
        }
    }
}

/// Response DTO for post listings
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PostSummaryDto {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub status: PostStatus,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    pub comment_count: i32,
    pub view_count: i32,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub tags: Vec<TagSummaryDto>,
}

impl PostSummaryDto {
    pub fn with_tags(p: PostSummary, tags: Vec<TagSummaryDto>) -> Self {
        Self {
            id: p.id,
            title: p.title,
            slug: p.slug,
            excerpt: p.excerpt,
            status: p.status,
            category_id: p.category_id,
            category_name: p.category_name,
            category_slug: p.category_slug,
            comment_count: p.comment_count,
            view_count: p.view_count,
            published_at: p.published_at,
            created_at: p.created_at,
            tags,
        }
    }
}
