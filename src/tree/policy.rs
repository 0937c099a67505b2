use std::collections::HashSet;

use async_trait::async_trait;

use super::{NodeId, TreeError, TreeResult, TreeStore};

/// What a delete actually did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Removed ids, deepest first. Empty when the target did not exist.
    pub removed: Vec<NodeId>,
    /// Foreign rows detached from removed nodes.
    pub released: u64,
}

impl DeleteOutcome {
    pub fn is_noop(&self) -> bool {
        self.removed.is_empty()
    }
}

/// How a family treats descendants when one of its nodes is deleted.
#[async_trait]
pub trait DeletionPolicy: Send + Sync {
    async fn delete<S>(&self, store: &mut S, id: NodeId) -> TreeResult<DeleteOutcome>
    where
        S: TreeStore + ?Sized;
}

/// Refuses to delete a node that still has direct children. Never recurses.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectIfChildren;

#[async_trait]
impl DeletionPolicy for RejectIfChildren {
    async fn delete<S>(&self, store: &mut S, id: NodeId) -> TreeResult<DeleteOutcome>
    where
        S: TreeStore + ?Sized,
    {
        if !store.exists(id).await? {
            return Ok(DeleteOutcome::default());
        }

        let children = store.fetch_children(id).await?;
        if !children.is_empty() {
            return Err(TreeError::HasChildren {
                id,
                count: children.len(),
            });
        }

        let owner = store.owner_of(id).await?;
        let released = store.release_references(id).await?;
        store.delete_node(id).await?;
        if let Some(owner) = owner {
            store.refresh_owner(owner).await?;
        }

        Ok(DeleteOutcome {
            removed: vec![id],
            released,
        })
    }
}

/// Deletes the node together with its whole subtree.
#[derive(Debug, Clone, Copy, Default)]
pub struct CascadeRecursive;

#[async_trait]
impl DeletionPolicy for CascadeRecursive {
    async fn delete<S>(&self, store: &mut S, id: NodeId) -> TreeResult<DeleteOutcome>
    where
        S: TreeStore + ?Sized,
    {
        if !store.exists(id).await? {
            return Ok(DeleteOutcome::default());
        }

        let owner = store.owner_of(id).await?;

        // Breadth-first, one child lookup per node.
        let mut subtree = vec![id];
        let mut seen = HashSet::from([id]);
        let mut cursor = 0;
        while cursor < subtree.len() {
            let current = subtree[cursor];
            cursor += 1;
            for child in store.fetch_children(current).await? {
                if seen.insert(child) {
                    subtree.push(child);
                }
            }
        }

        let mut released = 0;
        let mut removed = Vec::with_capacity(subtree.len());
        for node in subtree.into_iter().rev() {
            released += store.release_references(node).await?;
            store.delete_node(node).await?;
            removed.push(node);
        }

        if let Some(owner) = owner {
            store.refresh_owner(owner).await?;
        }

        Ok(DeleteOutcome { removed, released })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::memory::MemoryStore;

    #[tokio::test]
    async fn test_reject_if_children_refuses() {
        let mut store = MemoryStore::from_links(&[(1, None), (2, Some(1))]);
        store.add_references(1, 3);
        let before = store.clone();

        let err = RejectIfChildren.delete(&mut store, 1).await.unwrap_err();

        assert!(matches!(err, TreeError::HasChildren { id: 1, count: 1 }));
        assert_eq!(store, before);
    }

    #[tokio::test]
    async fn test_reject_if_children_releases_references() {
        let mut store = MemoryStore::from_links(&[(1, None), (2, Some(1)), (3, None)]);
        store.add_references(3, 3);

        let outcome = RejectIfChildren.delete(&mut store, 3).await.unwrap();

        assert_eq!(outcome.removed, vec![3]);
        assert_eq!(outcome.released, 3);
        assert!(!store.contains(3));
        assert_eq!(store.references_to(3), 0);
        assert_eq!(store.detached(), 3);
        assert!(store.contains(1) && store.contains(2));
    }

    #[tokio::test]
    async fn test_reject_if_children_leaf_of_chain() {
        let mut store = MemoryStore::from_links(&[(1, None), (2, Some(1))]);

        let outcome = RejectIfChildren.delete(&mut store, 2).await.unwrap();

        assert_eq!(outcome.removed, vec![2]);
        assert_eq!(store.parent(1), None);
        assert!(store.contains(1));
    }

    #[tokio::test]
    async fn test_missing_target_is_noop() {
        let mut store = MemoryStore::from_links(&[(1, None)]);

        let a = RejectIfChildren.delete(&mut store, 9).await.unwrap();
        let b = CascadeRecursive.delete(&mut store, 9).await.unwrap();

        assert!(a.is_noop());
        assert!(b.is_noop());
        assert!(store.contains(1));
    }

    #[tokio::test]
    async fn test_cascade_removes_nested_replies_and_recounts() {
        // Post 100 owns comments 1..=5; 1 <- 2 <- 3 is the thread being removed.
        let mut store = MemoryStore::from_links(&[
            (1, None),
            (2, Some(1)),
            (3, Some(2)),
            (4, None),
            (5, Some(4)),
        ]);
        for id in 1..=5 {
            store.set_owner(id, 100);
        }
        store.set_approved(&[1, 2, 4]);
        store.set_counter(100, 99);

        let outcome = CascadeRecursive.delete(&mut store, 1).await.unwrap();

        assert_eq!(outcome.removed, vec![3, 2, 1]);
        for id in [1, 2, 3] {
            assert!(!store.contains(id));
        }
        assert!(store.contains(4) && store.contains(5));
        assert_eq!(store.counter(100), Some(1));
    }

    #[tokio::test]
    async fn test_cascade_on_leaf() {
        let mut store = MemoryStore::from_links(&[(1, None), (2, Some(1))]);
        store.set_owner(1, 7);
        store.set_owner(2, 7);
        store.set_approved(&[1, 2]);

        let outcome = CascadeRecursive.delete(&mut store, 2).await.unwrap();

        assert_eq!(outcome.removed, vec![2]);
        assert_eq!(store.counter(7), Some(1));
    }

    #[tokio::test]
    async fn test_cascade_failure_rolls_back() {
        let mut committed = MemoryStore::from_links(&[(1, None), (2, Some(1)), (3, Some(2))]);
        for id in 1..=3 {
            committed.set_owner(id, 100);
        }
        committed.set_approved(&[1, 2, 3]);
        committed.set_counter(100, 3);
        committed.fail_on_delete(2);
        let before = committed.clone();

        let mut tx = committed.begin();
        let result = CascadeRecursive.delete(&mut tx, 1).await;
        assert!(matches!(result, Err(TreeError::Store(_))));
        drop(tx);

        assert_eq!(committed, before);
    }

    #[tokio::test]
    async fn test_cascade_commit_applies() {
        let mut committed = MemoryStore::from_links(&[(1, None), (2, Some(1))]);

        let mut tx = committed.begin();
        CascadeRecursive.delete(&mut tx, 1).await.unwrap();
        tx.commit();

        assert!(!committed.contains(1));
        assert!(!committed.contains(2));
    }
}
