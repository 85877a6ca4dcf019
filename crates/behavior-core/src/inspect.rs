//! Read-only snapshots of a tree for debugging and tooling.
//!
//! Snapshots own their data, so they can outlive the tree and be sent to
//! another task or serialized (with the `serde` feature).

use chrono::{DateTime, Utc};

use crate::tree::{BehaviorTree, TreeState};
use crate::{Node, NodeId, Shape, Status};

/// Point-in-time view of one node and its subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub name: String,
    pub type_name: String,
    pub shape: Shape,
    pub last_status: Option<Status>,
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    /// Number of nodes in this subtree, itself included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(NodeSnapshot::node_count).sum::<usize>()
    }

    /// Finds a node in this snapshot by name, depth-first.
    pub fn find_by_name(&self, name: &str) -> Option<&NodeSnapshot> {
        if self.name == name {
            return Some(self);
        }
        self.children
            .iter()
            .find_map(|child| child.find_by_name(name))
    }
}

/// Point-in-time view of a whole [`BehaviorTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeSnapshot {
    pub name: String,
    pub state: TreeState,
    pub tick_count: u64,
    pub last_tick_time: Option<DateTime<Utc>>,
    pub last_status: Option<Status>,
    pub root: Option<NodeSnapshot>,
}

impl Node {
    pub fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot {
            id: self.id(),
            parent: self.parent(),
            name: self.name().to_owned(),
            type_name: self.type_name().to_owned(),
            shape: self.shape(),
            last_status: self.last_status(),
            children: self.children().iter().map(Node::snapshot).collect(),
        }
    }
}

impl BehaviorTree {
    pub fn snapshot(&self) -> TreeSnapshot {
        TreeSnapshot {
            name: self.name().to_owned(),
            state: self.state(),
            tick_count: self.tick_count(),
            last_tick_time: self.last_tick_time(),
            last_status: self.last_status(),
            root: self.root().map(Node::snapshot),
        }
    }
}
