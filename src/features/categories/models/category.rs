use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::tree::{NodeId, TreeNode};

/// Database model for category, with listing projections
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub parent_name: Option<String>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub sort_order: i32,
    /// Published posts only
    pub post_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TreeNode for Category {
    fn id(&self) -> NodeId {
        self.id
    }

    fn parent_id(&self) -> Option<NodeId> {
        self.parent_id
    }
}
