use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::tags::models::{PostTag, Tag};
use crate::shared::constants::{DEFAULT_POPULAR_TAGS, DEFAULT_TAG_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::shared::types::{nullable, page_offset};

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_TAG_PAGE_SIZE
}

fn default_popular_limit() -> i64 {
    DEFAULT_POPULAR_TAGS
}

/// Query params for listing tags
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct TagQueryParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    /// Items per page (default: 50, max: 100)
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,

    /// Case-insensitive match on the tag name
    pub search: Option<String>,
}

impl TagQueryParams {
    pub fn offset(&self) -> i64 {
        page_offset(self.page, self.limit())
    }

    pub fn limit(&self) -> i64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

/// Query params for the popular tags list
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PopularTagsQuery {
    /// Number of tags (default: 20, max: 100)
    #[serde(default = "default_popular_limit")]
    #[param(minimum = 1, maximum = 100)]
    pub limit: i64,
}

impl PopularTagsQuery {
    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }
}

/// Request DTO for creating a tag
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTagDto {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: String,

    #[validate(length(max = 255, message = "Description must not exceed 255 characters"))]
    pub description: Option<String>,
}

/// Request DTO for updating a tag. `description: null` clears it.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTagDto {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 255, message = "Description must not exceed 255 characters"))]
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
}

/// Response DTO for tag
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TagResponseDto {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    /// Published posts carrying the tag
    pub post_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Tag> for TagResponseDto {
    fn from(t: Tag) -> Self {
        Self {
            id: t.id,
            name: t.name,
            slug: t.slug,
            description: t.description,
            post_count: t.post_count,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

/// Tag as embedded in post responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TagSummaryDto {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl From<PostTag> for TagSummaryDto {
    fn from(t: PostTag) -> Self {
        Self {
            id: t.id,
            name: t.name,
            slug: t.slug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults() {
        let params: TagQueryParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.limit(), DEFAULT_TAG_PAGE_SIZE);
        assert_eq!(params.offset(), 0);
        assert!(params.search.is_none());

        let popular: PopularTagsQuery = serde_json::from_str(r#"{"limit": 500}"#).unwrap();
        assert_eq!(popular.limit(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_create_validation() {
        let dto = CreateTagDto {
            name: String::new(),
            description: Some("d".repeat(256)),
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
        assert!(errors.field_errors().contains_key("description"));
    }

    #[test]
    fn test_update_description_null_clears() {
        let keep: UpdateTagDto = serde_json::from_str(r#"{"name": "Rust"}"#).unwrap();
        let clear: UpdateTagDto = serde_json::from_str(r#"{"description": null}"#).unwrap();

        assert_eq!(keep.description, None);
        assert_eq!(clear.description, Some(None));
    }
}
