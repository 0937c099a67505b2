use sqlx::{PgExecutor, PgPool};

use crate::core::database::{lock_tree, TreeLock};
use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{
    CategoryListDto, CategoryResponseDto, CategoryTreeDto, CreateCategoryDto,
    DeleteCategoryResponseDto, UpdateCategoryDto,
};
use crate::features::categories::models::Category;
use crate::features::categories::store::PgCategoryStore;
use crate::shared::slug::slug_for;
use crate::tree::{assemble_tree, reparent, DeletionPolicy, RejectIfChildren, TreeError};

const LISTING_SELECT: &str = r#"
    SELECT c.id, c.parent_id, p.name AS parent_name, c.name, c.slug, c.description,
           c.sort_order,
           (SELECT COUNT(*) FROM posts WHERE posts.category_id = c.id
                AND posts.status = 'published') AS post_count,
           c.created_at, c.updated_at
    FROM categories c
    LEFT JOIN categories p ON p.id = c.parent_id
"#;

const DUPLICATE_SLUG: &str = "A category with this name already exists";

async fn fetch_category<'e>(executor: impl PgExecutor<'e>, id: i64) -> Result<Category> {
    sqlx::query_as::<_, Category>(&format!("{} WHERE c.id = $1", LISTING_SELECT))
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", id)))
}

/// Service for category operations
pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all categories, as a tree or as a flat list
    pub async fn list(&self, flat: bool) -> Result<CategoryListDto> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "{} ORDER BY c.parent_id NULLS FIRST, c.sort_order, c.created_at",
            LISTING_SELECT
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list categories: {:?}", e);
            AppError::Database(e)
        })?;

        if flat {
            return Ok(CategoryListDto::Flat(
                categories.into_iter().map(CategoryResponseDto::from).collect(),
            ));
        }

        Ok(CategoryListDto::Tree(
            assemble_tree(categories)
                .into_iter()
                .map(CategoryTreeDto::from)
                .collect(),
        ))
    }

    /// Get category by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<CategoryResponseDto> {
        let category =
            sqlx::query_as::<_, Category>(&format!("{} WHERE c.slug = $1", LISTING_SELECT))
                .bind(slug)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to get category by slug: {:?}", e);
                    AppError::Database(e)
                })?;

        category
            .map(CategoryResponseDto::from)
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", slug)))
    }

    /// Create a category, optionally under an existing parent
    pub async fn create(&self, dto: CreateCategoryDto) -> Result<CategoryResponseDto> {
        let slug = slug_for(&dto.name)?;

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        lock_tree(&mut tx, TreeLock::Categories)
            .await
            .map_err(AppError::Database)?;

        // A new row has no descendants, so only existence matters here.
        if let Some(parent_id) = dto.parent_id {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
                    .bind(parent_id)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(AppError::Database)?;
            if !exists {
                return Err(TreeError::ParentNotFound(parent_id).into());
            }
        }

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO categories (parent_id, name, slug, description, sort_order)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(dto.parent_id)
        .bind(&dto.name)
        .bind(&slug)
        .bind(&dto.description)
        .bind(dto.sort_order)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_db(e, DUPLICATE_SLUG))?;

        let category = fetch_category(&mut *tx, id).await?;
        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Category {} created with slug '{}'", id, slug);
        Ok(CategoryResponseDto::from(category))
    }

    /// Update a category. A move is cycle-checked under the category lock,
    /// in the same transaction as the rest of the update.
    pub async fn update(&self, id: i64, dto: UpdateCategoryDto) -> Result<CategoryResponseDto> {
        if dto.parent_id == Some(Some(id)) {
            return Err(TreeError::SelfParent(id).into());
        }

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        lock_tree(&mut tx, TreeLock::Categories)
            .await
            .map_err(AppError::Database)?;

        let existing = fetch_category(&mut *tx, id).await?;

        let parent_id = dto.parent_id.unwrap_or(existing.parent_id);
        if parent_id != existing.parent_id {
            reparent(&mut PgCategoryStore::new(&mut tx), id, parent_id).await?;
            tracing::info!("Category {} moved under {:?}", id, parent_id);
        }

        let slug = match dto.name.as_deref() {
            Some(name) if name != existing.name => slug_for(name)?,
            _ => existing.slug,
        };

        sqlx::query(
            r#"
            UPDATE categories
            SET name = $2, slug = $3, description = $4, sort_order = $5, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(dto.name.unwrap_or(existing.name))
        .bind(&slug)
        .bind(dto.description.unwrap_or(existing.description))
        .bind(dto.sort_order.unwrap_or(existing.sort_order))
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::from_db(e, DUPLICATE_SLUG))?;

        let category = fetch_category(&mut *tx, id).await?;
        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Category {} updated", id);
        Ok(CategoryResponseDto::from(category))
    }

    /// Delete a category that has no subcategories. Its posts become
    /// uncategorized in the same transaction.
    pub async fn delete(&self, id: i64) -> Result<DeleteCategoryResponseDto> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        lock_tree(&mut tx, TreeLock::Categories)
            .await
            .map_err(AppError::Database)?;

        let outcome = RejectIfChildren
            .delete(&mut PgCategoryStore::new(&mut tx), id)
            .await
            .map_err(|e| match e {
                TreeError::HasChildren { count, .. } => AppError::Conflict(format!(
                    "Category has {} subcategories; move or delete them first",
                    count
                )),
                other => other.into(),
            })?;

        tx.commit().await.map_err(AppError::Database)?;

        if outcome.is_noop() {
            tracing::info!("Category {} already gone, nothing deleted", id);
        } else {
            tracing::info!(
                "Category {} deleted, {} posts uncategorized",
                id,
                outcome.released
            );
        }
        Ok(DeleteCategoryResponseDto::from(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::test_database;

    #[tokio::test]
    async fn test_update_can_clear_description() {
        let Some(pool) = test_database().await else {
            return;
        };
        let service = CategoryService::new(pool);
        let created = service
            .create(CreateCategoryDto {
                name: format!("Fixture {}", uuid::Uuid::new_v4().simple()),
                description: Some("Temporary".to_string()),
                parent_id: None,
                sort_order: 0,
            })
            .await
            .unwrap();

        let kept = service
            .update(created.id, UpdateCategoryDto::default())
            .await
            .unwrap();
        assert_eq!(kept.description.as_deref(), Some("Temporary"));

        let cleared = service
            .update(
                created.id,
                UpdateCategoryDto {
                    description: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.description, None);

        service.delete(created.id).await.unwrap();
    }
}
