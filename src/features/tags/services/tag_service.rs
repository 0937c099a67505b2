use std::collections::{BTreeSet, HashMap};

use sqlx::{PgConnection, PgExecutor, PgPool};

use crate::core::error::{AppError, Result};
use crate::features::tags::dtos::{
    CreateTagDto, PopularTagsQuery, TagQueryParams, TagResponseDto, TagSummaryDto, UpdateTagDto,
};
use crate::features::tags::models::{PostTag, Tag};
use crate::shared::slug::slug_for;
use crate::shared::types::like_pattern;

const TAG_SELECT: &str = r#"
    SELECT t.id, t.name, t.slug, t.description,
           COUNT(p.id) AS post_count,
           t.created_at, t.updated_at
    FROM tags t
    LEFT JOIN post_tags pt ON pt.tag_id = t.id
    LEFT JOIN posts p ON p.id = pt.post_id AND p.status = 'published'
"#;

const DUPLICATE_SLUG: &str = "A tag with this name already exists";

async fn fetch_tag<'e>(executor: impl PgExecutor<'e>, id: i64) -> Result<Tag> {
    sqlx::query_as::<_, Tag>(&format!("{} WHERE t.id = $1 GROUP BY t.id", TAG_SELECT))
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound(format!("Tag with id {} not found", id)))
}

/// Requested ids with no matching row, deduplicated and sorted.
fn missing_ids(requested: &[i64], found: &[i64]) -> Vec<i64> {
    let found: BTreeSet<i64> = found.iter().copied().collect();
    requested
        .iter()
        .copied()
        .collect::<BTreeSet<i64>>()
        .difference(&found)
        .copied()
        .collect()
}

fn group_by_post(rows: Vec<PostTag>) -> HashMap<i64, Vec<TagSummaryDto>> {
    let mut grouped: HashMap<i64, Vec<TagSummaryDto>> = HashMap::new();
    for row in rows {
        grouped
            .entry(row.post_id)
            .or_default()
            .push(TagSummaryDto::from(row));
    }
    grouped
}

/// Rejects a tag list naming tags that do not exist.
pub async fn check_tags<'e>(executor: impl PgExecutor<'e>, tag_ids: &[i64]) -> Result<()> {
    if tag_ids.is_empty() {
        return Ok(());
    }

    let found: Vec<i64> = sqlx::query_scalar("SELECT id FROM tags WHERE id = ANY($1)")
        .bind(tag_ids)
        .fetch_all(executor)
        .await
        .map_err(AppError::Database)?;

    let missing = missing_ids(tag_ids, &found);
    if !missing.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Unknown tag ids: {:?}",
            missing
        )));
    }
    Ok(())
}

/// Makes `tag_ids` the complete tag set of a post.
pub async fn replace_post_tags(conn: &mut PgConnection, post_id: i64, tag_ids: &[i64]) -> Result<()> {
    sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
        .bind(post_id)
        .execute(&mut *conn)
        .await
        .map_err(AppError::Database)?;

    if tag_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO post_tags (post_id, tag_id)
        SELECT $1, UNNEST($2::BIGINT[])
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(post_id)
    .bind(tag_ids)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::from_db(e, "Tag already attached"))?;

    Ok(())
}

/// Tags of each post in `post_ids`, by name. Posts without tags are absent.
pub async fn load_post_tags<'e>(
    executor: impl PgExecutor<'e>,
    post_ids: &[i64],
) -> Result<HashMap<i64, Vec<TagSummaryDto>>> {
    if post_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, PostTag>(
        r#"
        SELECT pt.post_id, t.id, t.name, t.slug
        FROM post_tags pt
        JOIN tags t ON t.id = pt.tag_id
        WHERE pt.post_id = ANY($1)
        ORDER BY t.name, t.id
        "#,
    )
    .bind(post_ids)
    .fetch_all(executor)
    .await
    .map_err(AppError::Database)?;

    Ok(group_by_post(rows))
}

/// Service for tag operations
pub struct TagService {
    pool: PgPool,
}

impl TagService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List tags, most used first
    pub async fn list(&self, params: &TagQueryParams) -> Result<(Vec<TagResponseDto>, i64)> {
        let pattern = like_pattern(params.search.as_deref());

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM tags WHERE ($1::TEXT IS NULL OR name ILIKE $1)")
                .bind(&pattern)
                .fetch_one(&self.pool)
                .await
                .map_err(AppError::Database)?;

        let tags = sqlx::query_as::<_, Tag>(&format!(
            r#"
            {}
            WHERE ($1::TEXT IS NULL OR t.name ILIKE $1)
            GROUP BY t.id
            ORDER BY post_count DESC, t.created_at DESC, t.id DESC
            LIMIT $2 OFFSET $3
            "#,
            TAG_SELECT
        ))
        .bind(&pattern)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list tags: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((tags.into_iter().map(TagResponseDto::from).collect(), total))
    }

    /// Tags carried by at least one published post
    pub async fn popular(&self, query: &PopularTagsQuery) -> Result<Vec<TagResponseDto>> {
        let tags = sqlx::query_as::<_, Tag>(&format!(
            r#"
            {}
            GROUP BY t.id
            HAVING COUNT(p.id) > 0
            ORDER BY post_count DESC, t.created_at DESC, t.id DESC
            LIMIT $1
            "#,
            TAG_SELECT
        ))
        .bind(query.limit())
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(tags.into_iter().map(TagResponseDto::from).collect())
    }

    /// Get tag by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<TagResponseDto> {
        sqlx::query_as::<_, Tag>(&format!("{} WHERE t.slug = $1 GROUP BY t.id", TAG_SELECT))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .map(TagResponseDto::from)
            .ok_or_else(|| AppError::NotFound(format!("Tag '{}' not found", slug)))
    }

    /// Create a tag
    pub async fn create(&self, dto: CreateTagDto) -> Result<TagResponseDto> {
        let slug = slug_for(&dto.name)?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO tags (name, slug, description) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&dto.name)
        .bind(&slug)
        .bind(&dto.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_db(e, DUPLICATE_SLUG))?;

        let tag = fetch_tag(&self.pool, id).await?;
        tracing::info!("Tag {} created with slug '{}'", id, slug);
        Ok(TagResponseDto::from(tag))
    }

    /// Update a tag. Renaming regenerates the slug.
    pub async fn update(&self, id: i64, dto: UpdateTagDto) -> Result<TagResponseDto> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let (name, slug, description): (String, String, Option<String>) =
            sqlx::query_as("SELECT name, slug, description FROM tags WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::Database)?
                .ok_or_else(|| AppError::NotFound(format!("Tag with id {} not found", id)))?;

        let slug = match dto.name.as_deref() {
            Some(new_name) if new_name != name => slug_for(new_name)?,
            _ => slug,
        };

        sqlx::query(
            r#"
            UPDATE tags
            SET name = $2, slug = $3, description = $4, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(dto.name.unwrap_or(name))
        .bind(&slug)
        .bind(dto.description.unwrap_or(description))
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::from_db(e, DUPLICATE_SLUG))?;

        let tag = fetch_tag(&mut *tx, id).await?;
        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Tag {} updated", id);
        Ok(TagResponseDto::from(tag))
    }

    /// Delete a tag; its post links go with it through the foreign key
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Tag with id {} not found", id)));
        }

        tracing::info!("Tag {} deleted", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(post_id: i64, id: i64, name: &str) -> PostTag {
        PostTag {
            post_id,
            id,
            name: name.to_string(),
            slug: name.to_lowercase(),
        }
    }

    #[test]
    fn test_missing_ids_dedupes_and_sorts() {
        assert_eq!(missing_ids(&[5, 3, 5, 1], &[1]), vec![3, 5]);
        assert!(missing_ids(&[2, 2], &[2]).is_empty());
    }

    #[test]
    fn test_group_by_post_keeps_row_order() {
        let grouped = group_by_post(vec![
            link(1, 10, "Async"),
            link(2, 10, "Async"),
            link(1, 11, "Rust"),
        ]);

        let names: Vec<&str> = grouped[&1].iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Async", "Rust"]);
        assert_eq!(grouped[&2].len(), 1);
        assert!(!grouped.contains_key(&3));
    }
}
