use std::collections::HashMap;

use super::NodeId;

/// A row that points at its parent by id.
pub trait TreeNode {
    fn id(&self) -> NodeId;
    fn parent_id(&self) -> Option<NodeId>;
}

/// Nested view over a flat working set. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree<T> {
    pub node: T,
    pub children: Vec<Tree<T>>,
}

/// Builds a forest from rows in any order.
///
/// Children keep their relative input order, and roots are returned in the
/// order they were first encountered. A row whose parent is not part of the
/// working set becomes a root. Rows that only reach each other through a
/// parent loop are also promoted to roots, so every input row appears exactly
/// once in the output.
pub fn assemble_tree<T: TreeNode>(nodes: Vec<T>) -> Vec<Tree<T>> {
    // First pass: id -> position. Duplicate ids resolve to the first row.
    let mut index: HashMap<NodeId, usize> = HashMap::with_capacity(nodes.len());
    for (pos, node) in nodes.iter().enumerate() {
        index.entry(node.id()).or_insert(pos);
    }

    // Second pass: attach each row to its parent, in input order.
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut attached_to: Vec<Option<usize>> = vec![None; nodes.len()];
    let mut roots: Vec<usize> = Vec::new();
    for (pos, node) in nodes.iter().enumerate() {
        match node.parent_id().and_then(|pid| index.get(&pid).copied()) {
            Some(parent) => {
                children[parent].push(pos);
                attached_to[pos] = Some(parent);
            }
            None => roots.push(pos),
        }
    }

    let mut reached = vec![false; nodes.len()];
    mark_reached(&roots, &children, &mut reached);

    for pos in 0..nodes.len() {
        if reached[pos] {
            continue;
        }
        if let Some(parent) = attached_to[pos].take() {
            children[parent].retain(|&c| c != pos);
        }
        tracing::warn!(row = pos, "Parent loop in working set, promoting node to root");
        roots.push(pos);
        mark_reached(&[pos], &children, &mut reached);
    }
    roots.sort_unstable();

    let mut slots: Vec<Option<T>> = nodes.into_iter().map(Some).collect();
    roots
        .into_iter()
        .filter_map(|pos| build(pos, &mut slots, &children))
        .collect()
}

fn mark_reached(start: &[usize], children: &[Vec<usize>], reached: &mut [bool]) {
    let mut stack: Vec<usize> = start.to_vec();
    while let Some(pos) = stack.pop() {
        if reached[pos] {
            continue;
        }
        reached[pos] = true;
        stack.extend(children[pos].iter().copied());
    }
}

fn build<T>(pos: usize, slots: &mut [Option<T>], children: &[Vec<usize>]) -> Option<Tree<T>> {
    let node = slots[pos].take()?;
    let children = children[pos]
        .iter()
        .filter_map(|&child| build(child, slots, children))
        .collect();
    Some(Tree { node, children })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: NodeId,
        parent_id: Option<NodeId>,
    }

    impl TreeNode for Row {
        fn id(&self) -> NodeId {
            self.id
        }

        fn parent_id(&self) -> Option<NodeId> {
            self.parent_id
        }
    }

    fn row(id: NodeId, parent_id: Option<NodeId>) -> Row {
        Row { id, parent_id }
    }

    fn ids(trees: &[Tree<Row>]) -> Vec<NodeId> {
        trees.iter().map(|t| t.node.id).collect()
    }

    fn size(tree: &Tree<Row>) -> usize {
        1 + tree.children.iter().map(size).sum::<usize>()
    }

    fn collect_edges(tree: &Tree<Row>, parent: Option<NodeId>, out: &mut Vec<(NodeId, Option<NodeId>)>) {
        out.push((tree.node.id, parent));
        for child in &tree.children {
            collect_edges(child, Some(tree.node.id), out);
        }
    }

    #[test]
    fn test_empty_input() {
        let forest = assemble_tree(Vec::<Row>::new());
        assert!(forest.is_empty());
    }

    #[test]
    fn test_all_roots_stay_flat() {
        let forest = assemble_tree(vec![row(3, None), row(1, None), row(2, None)]);

        assert_eq!(ids(&forest), vec![3, 1, 2]);
        assert!(forest.iter().all(|t| t.children.is_empty()));
    }

    #[test]
    fn test_children_keep_input_order() {
        let forest = assemble_tree(vec![
            row(1, None),
            row(4, Some(1)),
            row(2, Some(1)),
            row(3, Some(1)),
        ]);

        assert_eq!(ids(&forest), vec![1]);
        assert_eq!(ids(&forest[0].children), vec![4, 2, 3]);
    }

    #[test]
    fn test_child_before_parent() {
        let forest = assemble_tree(vec![row(3, Some(2)), row(2, Some(1)), row(1, None)]);

        assert_eq!(ids(&forest), vec![1]);
        assert_eq!(ids(&forest[0].children), vec![2]);
        assert_eq!(ids(&forest[0].children[0].children), vec![3]);
        assert_eq!(size(&forest[0]), 3);
    }

    #[test]
    fn test_missing_parent_becomes_root() {
        let forest = assemble_tree(vec![row(1, None), row(5, Some(99)), row(6, Some(5))]);

        assert_eq!(ids(&forest), vec![1, 5]);
        assert_eq!(ids(&forest[1].children), vec![6]);
    }

    #[test]
    fn test_parent_loop_is_promoted_not_dropped() {
        let forest = assemble_tree(vec![
            row(1, None),
            row(7, Some(8)),
            row(8, Some(7)),
            row(9, Some(9)),
        ]);

        let total: usize = forest.iter().map(size).sum();
        assert_eq!(total, 4);
        assert_eq!(ids(&forest), vec![1, 7, 9]);
        assert_eq!(ids(&forest[1].children), vec![8]);
        assert!(forest[2].children.is_empty());
    }

    #[test]
    fn test_preserves_count_and_parent_links() {
        let input = vec![
            row(10, Some(4)),
            row(1, None),
            row(4, Some(1)),
            row(7, Some(1)),
            row(12, Some(7)),
            row(13, Some(42)),
            row(2, None),
            row(11, Some(4)),
        ];
        let present: Vec<NodeId> = input.iter().map(|r| r.id).collect();
        let forest = assemble_tree(input.clone());

        let mut edges = Vec::new();
        for tree in &forest {
            collect_edges(tree, None, &mut edges);
        }
        assert_eq!(edges.len(), input.len());

        for original in &input {
            let (_, computed) = edges
                .iter()
                .find(|(id, _)| *id == original.id)
                .copied()
                .unwrap();
            match original.parent_id {
                Some(pid) if present.contains(&pid) => assert_eq!(computed, Some(pid)),
                _ => assert_eq!(computed, None),
            }
        }
    }
}
