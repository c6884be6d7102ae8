//! Hierarchical tree representation of the annotated path list.
//!
//! A flat, pre-sorted list of tracked paths is folded into nested
//! directory nodes; directory recency is derived from descendant files
//! in a separate post-order pass so the invariant stays checkable.

mod node;

pub use node::TreeNode;
