//! In-memory [`TreeStore`] used by unit tests.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;

use super::{NodeId, TreeResult, TreeStore};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    nodes: BTreeMap<NodeId, Option<NodeId>>,
    owners: BTreeMap<NodeId, NodeId>,
    approved: BTreeSet<NodeId>,
    counters: BTreeMap<NodeId, i64>,
    references: BTreeMap<NodeId, u64>,
    detached: u64,
    fail_on_delete: Option<NodeId>,
}

impl MemoryStore {
    pub fn from_links(links: &[(NodeId, Option<NodeId>)]) -> Self {
        Self {
            nodes: links.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn links(&self) -> Vec<(NodeId, Option<NodeId>)> {
        self.nodes.iter().map(|(id, parent)| (*id, *parent)).collect()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).copied().flatten()
    }

    pub fn set_owner(&mut self, id: NodeId, owner: NodeId) {
        self.owners.insert(id, owner);
    }

    pub fn set_approved(&mut self, ids: &[NodeId]) {
        self.approved.extend(ids.iter().copied());
    }

    pub fn set_counter(&mut self, owner: NodeId, value: i64) {
        self.counters.insert(owner, value);
    }

    pub fn counter(&self, owner: NodeId) -> Option<i64> {
        self.counters.get(&owner).copied()
    }

    /// Pretends `count` foreign rows point at `id`.
    pub fn add_references(&mut self, id: NodeId, count: u64) {
        *self.references.entry(id).or_default() += count;
    }

    pub fn references_to(&self, id: NodeId) -> u64 {
        self.references.get(&id).copied().unwrap_or(0)
    }

    /// Foreign rows detached so far.
    pub fn detached(&self) -> u64 {
        self.detached
    }

    /// Makes `delete_node(id)` fail with a storage error.
    pub fn fail_on_delete(&mut self, id: NodeId) {
        self.fail_on_delete = Some(id);
    }

    /// Starts a transaction over a private copy of the store.
    pub fn begin(&mut self) -> MemoryTx<'_> {
        MemoryTx {
            working: self.clone(),
            target: self,
        }
    }
}

#[async_trait]
impl TreeStore for MemoryStore {
    async fn exists(&mut self, id: NodeId) -> TreeResult<bool> {
        Ok(self.nodes.contains_key(&id))
    }

    async fn fetch_parent(&mut self, id: NodeId) -> TreeResult<Option<NodeId>> {
        Ok(self.parent(id))
    }

    async fn fetch_children(&mut self, id: NodeId) -> TreeResult<Vec<NodeId>> {
        Ok(self
            .nodes
            .iter()
            .filter(|(_, parent)| **parent == Some(id))
            .map(|(child, _)| *child)
            .collect())
    }

    async fn update_parent(&mut self, id: NodeId, parent: Option<NodeId>) -> TreeResult<()> {
        if let Some(slot) = self.nodes.get_mut(&id) {
            *slot = parent;
        }
        Ok(())
    }

    async fn delete_node(&mut self, id: NodeId) -> TreeResult<()> {
        if self.fail_on_delete == Some(id) {
            return Err(sqlx::Error::Protocol(format!("injected failure deleting {}", id)).into());
        }
        self.nodes.remove(&id);
        self.approved.remove(&id);
        self.owners.remove(&id);
        Ok(())
    }

    async fn release_references(&mut self, id: NodeId) -> TreeResult<u64> {
        let released = self.references.remove(&id).unwrap_or(0);
        self.detached += released;
        Ok(released)
    }

    async fn owner_of(&mut self, id: NodeId) -> TreeResult<Option<NodeId>> {
        Ok(self.owners.get(&id).copied())
    }

    async fn refresh_owner(&mut self, owner: NodeId) -> TreeResult<()> {
        let live = self
            .owners
            .iter()
            .filter(|(id, o)| **o == owner && self.approved.contains(*id))
            .count();
        self.counters.insert(owner, live as i64);
        Ok(())
    }
}

/// Uncommitted view over a [`MemoryStore`]. Dropping it discards the changes.
pub struct MemoryTx<'a> {
    target: &'a mut MemoryStore,
    working: MemoryStore,
}

impl MemoryTx<'_> {
    pub fn commit(self) {
        *self.target = self.working;
    }
}

#[async_trait]
impl TreeStore for MemoryTx<'_> {
    async fn exists(&mut self, id: NodeId) -> TreeResult<bool> {
        self.working.exists(id).await
    }

    async fn fetch_parent(&mut self, id: NodeId) -> TreeResult<Option<NodeId>> {
        self.working.fetch_parent(id).await
    }

    async fn fetch_children(&mut self, id: NodeId) -> TreeResult<Vec<NodeId>> {
        self.working.fetch_children(id).await
    }

    async fn update_parent(&mut self, id: NodeId, parent: Option<NodeId>) -> TreeResult<()> {
        self.working.update_parent(id, parent).await
    }

    async fn delete_node(&mut self, id: NodeId) -> TreeResult<()> {
        self.working.delete_node(id).await
    }

    async fn release_references(&mut self, id: NodeId) -> TreeResult<u64> {
        self.working.release_references(id).await
    }

    async fn owner_of(&mut self, id: NodeId) -> TreeResult<Option<NodeId>> {
        self.working.owner_of(id).await
    }

    async fn refresh_owner(&mut self, owner: NodeId) -> TreeResult<()> {
        self.working.refresh_owner(owner).await
    }
}
