//! Error types for scene graph mutations

use thiserror::Error;

use crate::graph::NodeId;

/// Errors raised when a mutation would break the tree invariants.
///
/// A failed mutation leaves the graph untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("node labels must not be empty")]
    EmptyLabel,

    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    #[error("adding {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    #[error("a sibling labelled '{label}' already exists")]
    DuplicateLabel { label: String },

    #[error("the root node cannot be attached to a parent")]
    RootHasNoParent,
}

impl From<GraphError> for scenecrate_core::Error {
    fn from(err: GraphError) -> Self {
        scenecrate_core::Error::Graph(err.to_string())
    }
}
