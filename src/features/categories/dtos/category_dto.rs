use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::categories::models::Category;
use crate::shared::types::nullable;
use crate::tree::{DeleteOutcome, Tree};

/// Query params for listing categories
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct CategoryQueryParams {
    /// Return a flat list instead of the tree. Default: false
    #[serde(default)]
    pub flat: bool,
}

/// Request DTO for creating a category
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryDto {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: String,

    #[validate(length(max = 500, message = "Description must not exceed 500 characters"))]
    pub description: Option<String>,

    #[validate(range(min = 1, message = "parent_id must be positive"))]
    pub parent_id: Option<i64>,

    #[serde(default)]
    pub sort_order: i32,
}

/// Request DTO for updating a category.
///
/// `parent_id` and `description` distinguish absent (keep) from `null`
/// (move to root, clear the description).
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryDto {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 500, message = "Description must not exceed 500 characters"))]
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,

    pub sort_order: Option<i32>,

    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<i64>)]
    pub parent_id: Option<Option<i64>>,
}

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponseDto {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub parent_name: Option<String>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub post_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            parent_id: c.parent_id,
            parent_name: c.parent_name,
            name: c.name,
            slug: c.slug,
            description: c.description,
            sort_order: c.sort_order,
            post_count: c.post_count,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Response DTO for category tree (hierarchical structure)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(no_recursion)]
pub struct CategoryTreeDto {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub post_count: i64,
    pub children: Vec<CategoryTreeDto>,
}

impl From<Tree<Category>> for CategoryTreeDto {
    fn from(tree: Tree<Category>) -> Self {
        let c = tree.node;
        Self {
            id: c.id,
            parent_id: c.parent_id,
            name: c.name,
            slug: c.slug,
            description: c.description,
            sort_order: c.sort_order,
            post_count: c.post_count,
            children: tree.children.into_iter().map(Self::from).collect(),
        }
    }
}

/// Either shape of the category listing
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum CategoryListDto {
    Tree(Vec<CategoryTreeDto>),
    Flat(Vec<CategoryResponseDto>),
}

/// Result of a category delete
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeleteCategoryResponseDto {
    /// Empty when the category did not exist
    pub removed: Vec<i64>,
    /// Posts moved to "uncategorized"
    pub detached_posts: u64,
}

impl From<DeleteOutcome> for DeleteCategoryResponseDto {
    fn from(outcome: DeleteOutcome) -> Self {
        Self {
            removed: outcome.removed,
            detached_posts: outcome.released,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::assemble_tree;

    fn listing(id: i64, parent_id: Option<i64>, name: &str) -> Category {
        Category {
            id,
            parent_id,
            parent_name: None,
            name: name.to_string(),
            slug: name.to_lowercase(),
            description: None,
            sort_order: 0,
            post_count: id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_tree_dto_keeps_nesting() {
        let rows = vec![
            listing(1, None, "Tech"),
            listing(2, Some(1), "Rust"),
            listing(3, Some(2), "Async"),
            listing(4, None, "Life"),
        ];

        let trees: Vec<CategoryTreeDto> = assemble_tree(rows)
            .into_iter()
            .map(CategoryTreeDto::from)
            .collect();

        assert_eq!(trees.len(), 2);
        assert_eq!(trees[0].name, "Tech");
        assert_eq!(trees[0].children[0].name, "Rust");
        assert_eq!(trees[0].children[0].children[0].post_count, 3);
        assert!(trees[1].children.is_empty());
    }

    #[test]
    fn test_list_serializes_without_tag() {
        let list = CategoryListDto::Tree(vec![]);
        assert_eq!(serde_json::to_value(list).unwrap(), serde_json::json!([]));
    }

    #[test]
    fn test_update_parent_absent_vs_null() {
        let keep: UpdateCategoryDto = serde_json::from_str(r#"{"name": "Go"}"#).unwrap();
        let root: UpdateCategoryDto = serde_json::from_str(r#"{"parent_id": null}"#).unwrap();
        let moved: UpdateCategoryDto = serde_json::from_str(r#"{"parent_id": 4}"#).unwrap();

        assert_eq!(keep.parent_id, None);
        assert_eq!(root.parent_id, Some(None));
        assert_eq!(moved.parent_id, Some(Some(4)));
    }

    #[test]
    fn test_create_validation() {
        let dto = CreateCategoryDto {
            name: "x".repeat(51),
            description: Some("d".repeat(501)),
            parent_id: None,
            sort_order: 0,
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
        assert!(errors.field_errors().contains_key("description"));
    }

    #[test]
    fn test_update_description_null_clears() {
        let keep: UpdateCategoryDto = serde_json::from_str(r#"{"name": "Go"}"#).unwrap();
        let clear: UpdateCategoryDto =
            serde_json::from_str(r#"{"description": null}"#).unwrap();

        assert_eq!(keep.description, None);
        assert_eq!(clear.description, Some(None));
        assert!(clear.validate().is_ok());

        let too_long = UpdateCategoryDto {
            description: Some(Some("d".repeat(501))),
            ..Default::default()
        };
        assert!(too_long
            .validate()
            .unwrap_err()
            .field_errors()
            .contains_key("description"));
    }
}
