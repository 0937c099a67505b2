use async_trait::async_trait;

use super::{NodeId, TreeResult};

/// Persistence collaborator for one tree family.
///
/// Implementations are expected to run every call inside the caller's open
/// transaction, so a failed operation leaves nothing behind once the
/// transaction is dropped.
#[async_trait]
pub trait TreeStore: Send {
    async fn exists(&mut self, id: NodeId) -> TreeResult<bool>;

    /// Current parent of `id`. `None` for roots and for ids that do not exist.
    async fn fetch_parent(&mut self, id: NodeId) -> TreeResult<Option<NodeId>>;

    async fn fetch_children(&mut self, id: NodeId) -> TreeResult<Vec<NodeId>>;

    async fn update_parent(&mut self, id: NodeId, parent: Option<NodeId>) -> TreeResult<()>;

    async fn delete_node(&mut self, id: NodeId) -> TreeResult<()>;

    /// Clears rows of other tables that point at `id`. Returns rows touched.
    async fn release_references(&mut self, _id: NodeId) -> TreeResult<u64> {
        Ok(0)
    }

    /// Content item that owns `id`, when the family has one.
    async fn owner_of(&mut self, _id: NodeId) -> TreeResult<Option<NodeId>> {
        Ok(None)
    }

    /// Recomputes counters kept on the owner from the rows that are left.
    async fn refresh_owner(&mut self, _owner: NodeId) -> TreeResult<()> {
        Ok(())
    }
}
