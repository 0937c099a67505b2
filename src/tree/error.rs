use thiserror::Error;

use super::NodeId;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Node {0} cannot be its own parent")]
    SelfParent(NodeId),

    #[error("Moving node {node} under {parent} would create a cycle")]
    Cycle { node: NodeId, parent: NodeId },

    #[error("Node {0} not found")]
    NotFound(NodeId),

    #[error("Parent node {0} not found")]
    ParentNotFound(NodeId),

    #[error("Node {id} still has {count} child node(s)")]
    HasChildren { id: NodeId, count: usize },

    #[error("Storage error: {0}")]
    Store(#[from] sqlx::Error),
}

pub type TreeResult<T> = std::result::Result<T, TreeError>;
