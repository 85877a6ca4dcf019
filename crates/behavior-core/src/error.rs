//! Error types raised while building and ticking trees.

use thiserror::Error;

use crate::node::Shape;

pub type Result<T, E = TickError> = std::result::Result<T, E>;

/// Boxed error carried by a leaf fault.
pub type Fault = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while constructing or binding a tree.
///
/// These fail fast: a tree that produced one is never ticked.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("unknown node type `{node_type}` requested for `{node}`")]
    UnknownType { node_type: String, node: String },

    #[error("{shape} node `{node}` ({node_type}) cannot take another child")]
    ChildLimit {
        node: String,
        node_type: &'static str,
        shape: Shape,
    },

    #[error("composite node `{node}` ({node_type}) has no children")]
    EmptyComposite {
        node: String,
        node_type: &'static str,
    },

    #[error("decorator node `{node}` ({node_type}) has no child")]
    MissingChild {
        node: String,
        node_type: &'static str,
    },

    #[error("node `{node}` ({node_type}) is missing required attribute `{attribute}`")]
    MissingAttribute {
        node: String,
        node_type: String,
        attribute: String,
    },

    #[error("node `{node}` ({node_type}) has invalid attribute `{attribute}`: {reason}")]
    InvalidAttribute {
        node: String,
        node_type: String,
        attribute: String,
        reason: String,
    },

    #[error("attribute `{attribute}` given more than once")]
    DuplicateAttribute { attribute: String },

    #[error("{node_type} cannot use {policy} as a {role} policy")]
    InvalidPolicy {
        node_type: &'static str,
        policy: crate::Policy,
        role: &'static str,
    },

    #[error("node `{node}` ({node_type}) needs a `{field}` of at least 1")]
    ZeroCount {
        node: String,
        node_type: &'static str,
        field: &'static str,
    },

    #[error("tree depth {depth} exceeds the configured maximum of {max}")]
    TooDeep { depth: usize, max: usize },
}

/// Errors raised while ticking a tree.
#[derive(Debug, Error)]
pub enum TickError {
    #[error("tree has no root bound; call bind() before tick()")]
    Uninitialized,

    #[error("leaf `{node}` faulted")]
    LeafFault {
        node: String,
        #[source]
        source: Fault,
    },

    #[error("decorator `{node}` was ticked without a child")]
    MissingChild { node: String },

    #[error("composite `{node}` was ticked without children")]
    EmptyComposite { node: String },
}

impl TickError {
    /// Wraps a leaf's error with the leaf's name.
    pub fn leaf_fault(node: impl Into<String>, source: impl Into<Fault>) -> Self {
        Self::LeafFault {
            node: node.into(),
            source: source.into(),
        }
    }

    /// Name of the node the error originated from, if any.
    pub fn node(&self) -> Option<&str> {
        match self {
            TickError::Uninitialized => None,
            TickError::LeafFault { node, .. }
            | TickError::MissingChild { node }
            | TickError::EmptyComposite { node } => Some(node),
        }
    }
}
