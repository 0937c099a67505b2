use sqlx::{PgExecutor, PgPool};

use crate::core::error::{AppError, Result};
use crate::features::posts::dtos::{
    CreatePostDto, PostQueryParams, PostResponseDto, PostSummaryDto, UpdatePostDto,
};
use crate::features::posts::models::{Post, PostSummary};
use crate::features::tags::services::{check_tags, load_post_tags, replace_post_tags};
use crate::shared::slug::slug_for;
use crate::shared::types::like_pattern;

const POST_COLUMNS: &str = r#"
    id, title, slug, excerpt, content, status, category_id, comment_count,
    view_count, published_at, created_at, updated_at
"#;

const DUPLICATE_SLUG: &str = "A post with this title already exists";

/// Rejects a category id that does not point at an existing category.
async fn ensure_category<'e>(executor: impl PgExecutor<'e>, category_id: Option<i64>) -> Result<()> {
    let Some(category_id) = category_id else {
        return Ok(());
    };

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
        .bind(category_id)
        .fetch_one(executor)
        .await
        .map_err(AppError::Database)?;

    if !exists {
        return Err(AppError::BadRequest(format!(
            "Category {} does not exist",
            category_id
        )));
    }
    Ok(())
}

/// Service for post operations
pub struct PostService {
    pool: PgPool,
}

impl PostService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List published posts, newest first
    pub async fn list_published(
        &self,
        params: &PostQueryParams,
    ) -> Result<(Vec<PostSummaryDto>, i64)> {
        let pattern = like_pattern(params.search.as_deref());

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM posts p
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE p.status = 'published'
              AND ($1::TEXT IS NULL OR c.slug = $1)
              AND ($2::TEXT IS NULL OR p.title ILIKE $2 OR p.content ILIKE $2)
            "#,
        )
        .bind(params.category.as_deref())
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        let posts = sqlx::query_as::<_, PostSummary>(
            r#"
            SELECT p.id, p.title, p.slug, p.excerpt, p.status, p.category_id,
                   c.name AS category_name, c.slug AS category_slug,
                   p.comment_count, p.view_count, p.published_at, p.created_at
            FROM posts p
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE p.status = 'published'
              AND ($1::TEXT IS NULL OR c.slug = $1)
              AND ($2::TEXT IS NULL OR p.title ILIKE $2 OR p.content ILIKE $2)
            ORDER BY p.published_at DESC NULLS LAST, p.id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(params.category.as_deref())
        .bind(&pattern)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
        let mut tags = load_post_tags(&self.pool, &ids).await?;

        let posts = posts
            .into_iter()
            .map(|p| {
                let post_tags = tags.remove(&p.id).unwrap_or_default();
                PostSummaryDto::with_tags(p, post_tags)
            })
            .collect();

        Ok((posts, total))
    }

    /// Get a published post by slug, counting the view
    pub async fn get_published_by_slug(&self, slug: &str) -> Result<PostResponseDto> {
        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            UPDATE posts
            SET view_count = view_count + 1
            WHERE slug = $1 AND status = 'published'
            RETURNING {}
            "#,
            POST_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound(format!("Post '{}' not found", slug)))?;

        self.with_tags(post).await
    }

    async fn with_tags(&self, post: Post) -> Result<PostResponseDto> {
        let tags = load_post_tags(&self.pool, &[post.id])
            .await?
            .remove(&post.id)
            .unwrap_or_default();
        Ok(PostResponseDto::with_tags(post, tags))
    }

    /// Create a new post with its tags
    pub async fn create(&self, dto: CreatePostDto) -> Result<PostResponseDto> {
        let slug = slug_for(&dto.title)?;

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        ensure_category(&mut *tx, dto.category_id).await?;
        check_tags(&mut *tx, &dto.tags).await?;

        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            INSERT INTO posts (title, slug, excerpt, content, status, category_id, published_at)
            VALUES ($1, $2, $3, $4, $5, $6, CASE WHEN $5 = 'published'::post_status THEN NOW() END)
            RETURNING {}
            "#,
            POST_COLUMNS
        ))
        .bind(&dto.title)
        .bind(&slug)
        .bind(&dto.excerpt)
        .bind(&dto.content)
        .bind(dto.status)
        .bind(dto.category_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_db(e, DUPLICATE_SLUG))?;

        replace_post_tags(&mut tx, post.id, &dto.tags).await?;
        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Post {} created with slug '{}'", post.id, post.slug);
        self.with_tags(post).await
    }

    /// Update a post. A new title regenerates the slug.
    pub async fn update(&self, id: i64, dto: UpdatePostDto) -> Result<PostResponseDto> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let existing = sqlx::query_as::<_, Post>(&format!(
            "SELECT {} FROM posts WHERE id = $1 FOR UPDATE",
            POST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound(format!("Post with id {} not found", id)))?;

        let slug = match dto.title.as_deref() {
            Some(title) if title != existing.title => slug_for(title)?,
            _ => existing.slug.clone(),
        };
        let category_id = dto.category_id.unwrap_or(existing.category_id);
        if category_id != existing.category_id {
            ensure_category(&mut *tx, category_id).await?;
        }
        if let Some(tags) = &dto.tags {
            check_tags(&mut *tx, tags).await?;
        }

        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            UPDATE posts
            SET title = $2,
                slug = $3,
                excerpt = $4,
                content = $5,
                status = $6,
                category_id = $7,
                published_at = CASE
                    WHEN $6 = 'published'::post_status AND published_at IS NULL THEN NOW()
                    ELSE published_at
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            POST_COLUMNS
        ))
        .bind(id)
        .bind(dto.title.unwrap_or(existing.title))
        .bind(&slug)
        .bind(dto.excerpt.unwrap_or(existing.excerpt))
        .bind(dto.content.unwrap_or(existing.content))
        .bind(dto.status.unwrap_or(existing.status))
        .bind(category_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_db(e, DUPLICATE_SLUG))?;

        if let Some(tags) = &dto.tags {
            replace_post_tags(&mut tx, id, tags).await?;
        }
        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Post {} updated", id);
        self.with_tags(post).await
    }

    /// Delete a post; its comments go with it through the foreign key
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Post with id {} not found", id)));
        }

        tracing::info!("Post {} deleted", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::posts::models::PostStatus;
    use crate::features::tags::dtos::CreateTagDto;
    use crate::features::tags::TagService;
    use crate::shared::test_helpers::test_database;

    fn published(title: &str, content: &str, tags: Vec<i64>) -> CreatePostDto {
        CreatePostDto {
            title: title.to_string(),
            content: content.to_string(),
            excerpt: Some("Short".to_string()),
            status: PostStatus::Published,
            category_id: None,
            tags,
        }
    }

    #[tokio::test]
    async fn test_detail_counts_views_and_carries_tags() {
        let Some(pool) = test_database().await else {
            return;
        };
        let token = uuid::Uuid::new_v4().simple().to_string();
        let tag = TagService::new(pool.clone())
            .create(CreateTagDto {
                name: format!("Tag {}", token),
                description: None,
            })
            .await
            .unwrap();
        let service = PostService::new(pool.clone());
        let created = service
            .create(published(&format!("Post {}", token), "Body", vec![tag.id]))
            .await
            .unwrap();
        assert_eq!(created.view_count, 0);

        let first = service.get_published_by_slug(&created.slug).await.unwrap();
        let second = service.get_published_by_slug(&created.slug).await.unwrap();

        assert_eq!(first.view_count, 1);
        assert_eq!(second.view_count, 2);
        assert_eq!(second.tags.len(), 1);
        assert_eq!(second.tags[0].id, tag.id);

        service.delete(created.id).await.unwrap();
        TagService::new(pool).delete(tag.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_search_and_tag_replacement() {
        let Some(pool) = test_database().await else {
            return;
        };
        let token = uuid::Uuid::new_v4().simple().to_string();
        let service = PostService::new(pool.clone());
        let created = service
            .create(published(
                &format!("Searchable {}", token),
                &format!("Mentions needle{} once", token),
                vec![],
            ))
            .await
            .unwrap();

        let params = PostQueryParams {
            page: 1,
            page_size: 10,
            category: None,
            search: Some(format!("NEEDLE{}", token)),
        };
        let (posts, total) = service.list_published(&params).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(posts[0].id, created.id);

        let err = service
            .update(
                created.id,
                UpdatePostDto {
                    tags: Some(vec![i64::MAX]),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let cleared = service
            .update(
                created.id,
                UpdatePostDto {
                    excerpt: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.excerpt, None);

        service.delete(created.id).await.unwrap();
    }
}
