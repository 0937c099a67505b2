use std::collections::HashSet;

use super::{NodeId, TreeError, TreeResult, TreeStore};

/// Returns true when making `new_parent` the parent of `node` would close a
/// loop, i.e. `new_parent` is `node` itself or one of its descendants.
///
/// Walks upward from `new_parent` one parent lookup at a time. A loop that
/// already exists in storage is reported as a cycle as well.
pub async fn would_create_cycle<S>(store: &mut S, node: NodeId, new_parent: NodeId) -> TreeResult<bool>
where
    S: TreeStore + ?Sized,
{
    if node == new_parent {
        return Ok(true);
    }

    let mut seen = HashSet::from([new_parent]);
    let mut current = new_parent;
    while let Some(parent) = store.fetch_parent(current).await? {
        if parent == node {
            return Ok(true);
        }
        if !seen.insert(parent) {
            tracing::warn!(
                node = node,
                ancestor = parent,
                "Existing parent loop found during ancestry walk"
            );
            return Ok(true);
        }
        current = parent;
    }

    Ok(false)
}

/// Validates `new_parent` as the parent of `node` without mutating anything.
pub async fn check_parent<S>(store: &mut S, node: NodeId, new_parent: Option<NodeId>) -> TreeResult<()>
where
    S: TreeStore + ?Sized,
{
    let Some(parent) = new_parent else {
        return Ok(());
    };

    if parent == node {
        return Err(TreeError::SelfParent(node));
    }
    if !store.exists(parent).await? {
        return Err(TreeError::ParentNotFound(parent));
    }
    if would_create_cycle(store, node, parent).await? {
        tracing::warn!(node = node, parent = parent, "Rejected re-parent: cycle");
        return Err(TreeError::Cycle { node, parent });
    }

    Ok(())
}

/// Moves `node` under `new_parent` (or to the root when `None`).
pub async fn reparent<S>(store: &mut S, node: NodeId, new_parent: Option<NodeId>) -> TreeResult<()>
where
    S: TreeStore + ?Sized,
{
    if !store.exists(node).await? {
        return Err(TreeError::NotFound(node));
    }
    check_parent(store, node, new_parent).await?;
    store.update_parent(node, new_parent).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::memory::MemoryStore;

    /// 1 <- 2 <- 3, plus an unrelated root 4.
    fn chain() -> MemoryStore {
        MemoryStore::from_links(&[(1, None), (2, Some(1)), (3, Some(2)), (4, None)])
    }

    #[tokio::test]
    async fn test_self_parent_is_cycle() {
        let mut store = chain();
        for id in [1, 2, 3, 4, 99] {
            assert!(would_create_cycle(&mut store, id, id).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_grandchild_as_parent_is_cycle() {
        let mut store = chain();

        assert!(would_create_cycle(&mut store, 1, 3).await.unwrap());
        assert!(would_create_cycle(&mut store, 1, 2).await.unwrap());
        assert!(would_create_cycle(&mut store, 2, 3).await.unwrap());
    }

    #[tokio::test]
    async fn test_unrelated_or_ancestor_is_fine() {
        let mut store = chain();

        assert!(!would_create_cycle(&mut store, 3, 1).await.unwrap());
        assert!(!would_create_cycle(&mut store, 1, 4).await.unwrap());
        assert!(!would_create_cycle(&mut store, 4, 3).await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupted_loop_terminates() {
        let mut store = MemoryStore::from_links(&[(1, Some(2)), (2, Some(3)), (3, Some(2)), (5, None)]);

        assert!(would_create_cycle(&mut store, 5, 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_reparent_rejects_cycle_without_mutation() {
        let mut store = chain();
        let before = store.links();

        let err = reparent(&mut store, 1, Some(3)).await.unwrap_err();

        assert!(matches!(err, TreeError::Cycle { node: 1, parent: 3 }));
        assert_eq!(store.links(), before);
    }

    #[tokio::test]
    async fn test_reparent_rejects_self() {
        let mut store = chain();

        let err = reparent(&mut store, 2, Some(2)).await.unwrap_err();
        assert!(matches!(err, TreeError::SelfParent(2)));
    }

    #[tokio::test]
    async fn test_reparent_missing_nodes() {
        let mut store = chain();

        let err = reparent(&mut store, 42, Some(1)).await.unwrap_err();
        assert!(matches!(err, TreeError::NotFound(42)));

        let err = reparent(&mut store, 3, Some(42)).await.unwrap_err();
        assert!(matches!(err, TreeError::ParentNotFound(42)));
    }

    #[tokio::test]
    async fn test_reparent_moves_and_detaches() {
        let mut store = chain();

        reparent(&mut store, 3, Some(4)).await.unwrap();
        assert_eq!(store.parent(3), Some(4));

        reparent(&mut store, 2, None).await.unwrap();
        assert_eq!(store.parent(2), None);
    }
}
