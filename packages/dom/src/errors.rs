//! Error types for tree mutation

use crate::NodeId;
use thiserror::Error;

pub type DomResult<T> = Result<T, DomError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node is not attached to a parent: {0}")]
    Detached(NodeId),

    #[error("Node is already attached: {0}")]
    AlreadyAttached(NodeId),

    #[error("Node cannot have children: {0}")]
    NotAContainer(NodeId),

    #[error("Offset {offset} out of bounds for {node} (length {length})")]
    OffsetOutOfBounds {
        node: NodeId,
        offset: usize,
        length: usize,
    },

    #[error("Would create cycle")]
    CycleDetected,

    #[error("Node is not text: {0}")]
    NotText(NodeId),

    #[error("Node is not an element: {0}")]
    NotAnElement(NodeId),

    #[error("Boundaries are not in the same tree")]
    DisjointTrees,

    #[error("Journal does not match document: {0}")]
    JournalMismatch(String),
}
