//! Parent/child bookkeeping for self-referencing tables.
//!
//! Categories and comments are both stored as flat rows carrying an optional
//! `parent_id`. This module owns everything that depends only on that shape:
//!
//! - [`assemble_tree`] turns a flat working set into a nested view
//! - [`would_create_cycle`], [`check_parent`] and [`reparent`] keep the
//!   parent graph a forest
//! - [`DeletionPolicy`] decides what happens to descendants on delete
//!
//! Persistence goes through [`TreeStore`]; each feature provides a
//! PostgreSQL implementation bound to an open transaction.

mod assemble;
mod cycle;
mod error;
mod policy;
mod store;

#[cfg(test)]
pub mod memory;

pub use assemble::{assemble_tree, Tree, TreeNode};
pub use cycle::{check_parent, reparent, would_create_cycle};
pub use error::{TreeError, TreeResult};
pub use policy::{CascadeRecursive, DeleteOutcome, DeletionPolicy, RejectIfChildren};
pub use store::TreeStore;

/// Primary key type shared by every tree family.
pub type NodeId = i64;
