use async_trait::async_trait;
use sqlx::PgConnection;

use crate::tree::{NodeId, TreeResult, TreeStore};

/// Recomputes `posts.comment_count` from the approved comments left.
pub async fn refresh_comment_count(conn: &mut PgConnection, post_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE posts
        SET comment_count = (
            SELECT COUNT(*) FROM comments WHERE post_id = $1 AND status = 'approved'
        )
        WHERE id = $1
        "#,
    )
    .bind(post_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Comment rows seen through an open transaction.
pub struct PgCommentStore<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgCommentStore<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl TreeStore for PgCommentStore<'_> {
    async fn exists(&mut self, id: NodeId) -> TreeResult<bool> {
        let exists = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM comments WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(exists)
    }

    async fn fetch_parent(&mut self, id: NodeId) -> TreeResult<Option<NodeId>> {
        let parent: Option<Option<i64>> =
            sqlx::query_scalar("SELECT parent_id FROM comments WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *self.conn)
                .await?;
        Ok(parent.flatten())
    }

    async fn fetch_children(&mut self, id: NodeId) -> TreeResult<Vec<NodeId>> {
        let children =
            sqlx::query_scalar("SELECT id FROM comments WHERE parent_id = $1 ORDER BY created_at, id")
                .bind(id)
                .fetch_all(&mut *self.conn)
                .await?;
        Ok(children)
    }

    async fn update_parent(&mut self, id: NodeId, parent: Option<NodeId>) -> TreeResult<()> {
        sqlx::query("UPDATE comments SET parent_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(parent)
            .execute(&mut *self.conn)
            .await?;
        Ok(())
    }

    async fn delete_node(&mut self, id: NodeId) -> TreeResult<()> {
        sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        Ok(())
    }

    async fn owner_of(&mut self, id: NodeId) -> TreeResult<Option<NodeId>> {
        let post_id = sqlx::query_scalar("SELECT post_id FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(post_id)
    }

    async fn refresh_owner(&mut self, owner: NodeId) -> TreeResult<()> {
        refresh_comment_count(&mut *self.conn, owner).await?;
        Ok(())
    }
}
