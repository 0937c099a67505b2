use async_trait::async_trait;
use sqlx::PgConnection;

use crate::tree::{NodeId, TreeResult, TreeStore};

/// Category rows seen through an open transaction.
pub struct PgCategoryStore<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgCategoryStore<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl TreeStore for PgCategoryStore<'_> {
    async fn exists(&mut self, id: NodeId) -> TreeResult<bool> {
        let exists = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(exists)
    }

    async fn fetch_parent(&mut self, id: NodeId) -> TreeResult<Option<NodeId>> {
        let parent: Option<Option<i64>> =
            sqlx::query_scalar("SELECT parent_id FROM categories WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *self.conn)
                .await?;
        Ok(parent.flatten())
    }

    async fn fetch_children(&mut self, id: NodeId) -> TreeResult<Vec<NodeId>> {
        let children = sqlx::query_scalar(
            "SELECT id FROM categories WHERE parent_id = $1 ORDER BY sort_order, created_at",
        )
        .bind(id)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(children)
    }

    async fn update_parent(&mut self, id: NodeId, parent: Option<NodeId>) -> TreeResult<()> {
        sqlx::query("UPDATE categories SET parent_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(parent)
            .execute(&mut *self.conn)
            .await?;
        Ok(())
    }

    async fn delete_node(&mut self, id: NodeId) -> TreeResult<()> {
        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        Ok(())
    }

    /// Posts filed under the category become uncategorized.
    async fn release_references(&mut self, id: NodeId) -> TreeResult<u64> {
        let result = sqlx::query(
            "UPDATE posts SET category_id = NULL, updated_at = NOW() WHERE category_id = $1",
        )
        .bind(id)
        .execute(&mut *self.conn)
        .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{insert_post, test_database};
    use crate::tree::{reparent, DeletionPolicy, RejectIfChildren, TreeError};

    async fn insert_category(conn: &mut PgConnection, parent_id: Option<i64>) -> i64 {
        sqlx::query_scalar(
            "INSERT INTO categories (parent_id, name, slug) VALUES ($1, 'Fixture', $2) RETURNING id",
        )
        .bind(parent_id)
        .bind(format!("fixture-{}", uuid::Uuid::new_v4()))
        .fetch_one(conn)
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_delete_leaf_uncategorizes_its_posts() {
        let Some(pool) = test_database().await else {
            return;
        };
        let mut tx = pool.begin().await.unwrap();
        let category = insert_category(&mut tx, None).await;
        let mut posts = Vec::new();
        for _ in 0..3 {
            posts.push(insert_post(&mut tx, Some(category)).await);
        }

        let outcome = RejectIfChildren
            .delete(&mut PgCategoryStore::new(&mut tx), category)
            .await
            .unwrap();

        assert_eq!(outcome.removed, vec![category]);
        assert_eq!(outcome.released, 3);
        let uncategorized: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM posts WHERE id = ANY($1) AND category_id IS NULL",
        )
        .bind(&posts)
        .fetch_one(&mut *tx)
        .await
        .unwrap();
        assert_eq!(uncategorized, 3);
    }

    #[tokio::test]
    async fn test_delete_with_child_changes_nothing() {
        let Some(pool) = test_database().await else {
            return;
        };
        let mut tx = pool.begin().await.unwrap();
        let parent = insert_category(&mut tx, None).await;
        insert_category(&mut tx, Some(parent)).await;
        let post = insert_post(&mut tx, Some(parent)).await;

        let err = RejectIfChildren
            .delete(&mut PgCategoryStore::new(&mut tx), parent)
            .await
            .unwrap_err();

        assert!(matches!(err, TreeError::HasChildren { count: 1, .. }));
        let category_id: Option<i64> =
            sqlx::query_scalar("SELECT category_id FROM posts WHERE id = $1")
                .bind(post)
                .fetch_one(&mut *tx)
                .await
                .unwrap();
        assert_eq!(category_id, Some(parent));
    }

    #[tokio::test]
    async fn test_reparent_under_descendant_is_refused() {
        let Some(pool) = test_database().await else {
            return;
        };
        let mut tx = pool.begin().await.unwrap();
        let a = insert_category(&mut tx, None).await;
        let b = insert_category(&mut tx, Some(a)).await;
        let c = insert_category(&mut tx, Some(b)).await;

        let mut store = PgCategoryStore::new(&mut tx);
        let err = reparent(&mut store, a, Some(c)).await.unwrap_err();
        assert!(matches!(err, TreeError::Cycle { .. }));
        assert_eq!(store.fetch_parent(a).await.unwrap(), None);

        reparent(&mut store, c, None).await.unwrap();
        assert_eq!(store.fetch_parent(c).await.unwrap(), None);
    }
}
