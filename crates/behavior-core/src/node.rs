//! The node abstraction every tree is built from.
//!
//! A [`Node`] owns its identity (id and name), the status it reported last,
//! and its children. The *shape* of a node is closed and fixed when it is
//! constructed:
//!
//! - **Leaf**: no children; behaviour comes from an [`Action`] or a
//!   [`Condition`]
//! - **Decorator**: exactly one child; behaviour comes from a [`Decorate`]
//! - **Composite**: one or more ordered children; behaviour comes from a
//!   [`Compose`]
//!
//! The behaviour traits are open, so hosts add their own node types by
//! implementing one of them. Built-in composites and decorators implement
//! the same traits and get no special treatment.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::blackboard::Blackboard;
use crate::error::{BuildError, Result, TickError};
use crate::status::Status;

/// Process-unique identifier of a node.
///
/// Parents are referenced by id, never by an owning pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        NodeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The child-count class of a node.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Shape {
    /// No children.
    Leaf,
    /// Exactly one child.
    Decorator,
    /// One or more ordered children.
    Composite,
}

/// A leaf that performs an effect.
///
/// Actions may return `Running` to spread work over several ticks. The
/// action itself is responsible for remembering any progress it needs, in
/// its own fields or on the blackboard.
///
/// An `Err` is a fault, not a decision: it propagates to the caller of
/// `tick()` with the leaf's name attached instead of being turned into
/// `Failure`.
#[async_trait]
pub trait Action: Send {
    async fn execute(&mut self, blackboard: &Blackboard) -> anyhow::Result<Status>;

    /// Clears private progress. Called when the tree abandons this leaf.
    fn reset(&mut self) {}

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A leaf that evaluates a pure predicate.
///
/// `true` maps to `Success` and `false` to `Failure`; a condition can never
/// report `Running`.
pub trait Condition: Send + Sync {
    fn evaluate(&self, blackboard: &Blackboard) -> anyhow::Result<bool>;

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Behaviour of a single-child node.
///
/// `decorate` may tick the child zero or more times and transforms the
/// result. Private counters live in the implementor and persist across
/// ticks until the decorator reports a terminal status.
#[async_trait]
pub trait Decorate: Send {
    async fn decorate(&mut self, child: &mut Node, blackboard: &Blackboard) -> Result<Status>;

    fn reset(&mut self) {}

    fn type_name(&self) -> &'static str;
}

/// Behaviour of a multi-child node.
#[async_trait]
pub trait Compose: Send {
    async fn compose(&mut self, children: &mut [Node], blackboard: &Blackboard) -> Result<Status>;

    fn reset(&mut self) {}

    fn type_name(&self) -> &'static str;
}

enum NodeKind {
    Action(Box<dyn Action>),
    Condition(Box<dyn Condition>),
    Decorator {
        behavior: Box<dyn Decorate>,
        child: Option<Box<Node>>,
    },
    Composite {
        behavior: Box<dyn Compose>,
        children: Vec<Node>,
    },
}

/// A node of a behavior tree.
pub struct Node {
    id: NodeId,
    parent: Option<NodeId>,
    name: String,
    last_status: Option<Status>,
    kind: NodeKind,
}

impl Node {
    fn with_kind(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: NodeId::next(),
            parent: None,
            name: name.into(),
            last_status: None,
            kind,
        }
    }

    /// Creates an action leaf.
    pub fn action(name: impl Into<String>, action: impl Action + 'static) -> Self {
        Self::with_kind(name, NodeKind::Action(Box::new(action)))
    }

    /// Creates a condition leaf.
    pub fn condition(name: impl Into<String>, condition: impl Condition + 'static) -> Self {
        Self::with_kind(name, NodeKind::Condition(Box::new(condition)))
    }

    /// Creates a decorator wrapping `child`.
    pub fn decorator(
        name: impl Into<String>,
        behavior: impl Decorate + 'static,
        child: Node,
    ) -> Self {
        let mut node = Self::decorator_slot(name, behavior);
        node.adopt_single(child);
        node
    }

    /// Creates a decorator whose child is supplied later via [`add_child`](Self::add_child).
    ///
    /// A tree holding an empty slot is rejected by [`validate`](Self::validate).
    pub fn decorator_slot(name: impl Into<String>, behavior: impl Decorate + 'static) -> Self {
        Self::with_kind(
            name,
            NodeKind::Decorator {
                behavior: Box::new(behavior),
                child: None,
            },
        )
    }

    /// Creates a composite over `children`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::EmptyComposite`] if `children` is empty.
    pub fn composite(
        name: impl Into<String>,
        behavior: impl Compose + 'static,
        children: Vec<Node>,
    ) -> std::result::Result<Self, BuildError> {
        if children.is_empty() {
            return Err(BuildError::EmptyComposite {
                node: name.into(),
                node_type: behavior.type_name(),
            });
        }
        let mut node = Self::composite_slot(name, behavior);
        for child in children {
            node.add_child(child)?;
        }
        Ok(node)
    }

    /// Creates a composite whose children are supplied later via [`add_child`](Self::add_child).
    pub fn composite_slot(name: impl Into<String>, behavior: impl Compose + 'static) -> Self {
        Self::with_kind(
            name,
            NodeKind::Composite {
                behavior: Box::new(behavior),
                children: Vec::new(),
            },
        )
    }

    /// Attaches `child` under this node.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::ChildLimit`] if this node is a leaf, or a
    /// decorator that already has its child.
    pub fn add_child(&mut self, mut child: Node) -> std::result::Result<(), BuildError> {
        child.parent = Some(self.id);
        let accepted = match &mut self.kind {
            NodeKind::Decorator { child: slot, .. } if slot.is_none() => {
                *slot = Some(Box::new(child));
                true
            }
            NodeKind::Composite { children, .. } => {
                children.push(child);
                true
            }
            _ => false,
        };
        if accepted {
            return Ok(());
        }
        Err(BuildError::ChildLimit {
            node: self.name.clone(),
            node_type: self.type_name(),
            shape: self.shape(),
        })
    }

    fn adopt_single(&mut self, mut child: Node) {
        child.parent = Some(self.id);
        if let NodeKind::Decorator { child: slot, .. } = &mut self.kind {
            *slot = Some(Box::new(child));
        }
    }

    /// Ticks this node (and transitively its subtree) once.
    ///
    /// Records the returned status as [`last_status`](Self::last_status).
    /// Faults leave `last_status` untouched and propagate unchanged, so the
    /// error still names the leaf it came from.
    ///
    /// # Errors
    ///
    /// - [`TickError::LeafFault`] if a leaf in the subtree faulted
    /// - [`TickError::MissingChild`] / [`TickError::EmptyComposite`] if an
    ///   open slot is reached
    pub fn tick<'a>(&'a mut self, blackboard: &'a Blackboard) -> BoxFuture<'a, Result<Status>> {
        Box::pin(async move {
            let status = match &mut self.kind {
                // A mounted subtree reports a `TickError` of its own; it already
                // names the leaf that faulted and passes through as is.
                NodeKind::Action(action) => action.execute(blackboard).await.map_err(|source| {
                    source
                        .downcast::<TickError>()
                        .unwrap_or_else(|source| TickError::leaf_fault(self.name.as_str(), source))
                })?,
                NodeKind::Condition(condition) => condition
                    .evaluate(blackboard)
                    .map(Status::from)
                    .map_err(|source| TickError::leaf_fault(self.name.as_str(), source))?,
                NodeKind::Decorator { behavior, child } => {
                    let Some(child) = child.as_deref_mut() else {
                        return Err(TickError::MissingChild {
                            node: self.name.clone(),
                        });
                    };
                    behavior.decorate(child, blackboard).await?
                }
                NodeKind::Composite { behavior, children } => {
                    if children.is_empty() {
                        return Err(TickError::EmptyComposite {
                            node: self.name.clone(),
                        });
                    }
                    behavior.compose(children, blackboard).await?
                }
            };

            tracing::trace!(node = %self.name, id = %self.id, %status, "ticked");
            self.last_status = Some(status);
            Ok(status)
        })
    }

    /// Clears private run-state for this node and its whole subtree.
    ///
    /// Decorator counters, memory composite indices, and leaf progress are
    /// dropped; `last_status` returns to `None`. The blackboard is left alone.
    pub fn reset(&mut self) {
        self.last_status = None;
        match &mut self.kind {
            NodeKind::Action(action) => action.reset(),
            NodeKind::Condition(_) => {}
            NodeKind::Decorator { behavior, child } => {
                behavior.reset();
                if let Some(child) = child.as_deref_mut() {
                    child.reset();
                }
            }
            NodeKind::Composite { behavior, children } => {
                behavior.reset();
                children.iter_mut().for_each(Node::reset);
            }
        }
    }

    /// Checks the child-count invariant across the whole subtree.
    ///
    /// # Errors
    ///
    /// Returns the first open decorator slot or empty composite found in
    /// depth-first order.
    pub fn validate(&self) -> std::result::Result<(), BuildError> {
        for (_, node) in self.walk() {
            match &node.kind {
                NodeKind::Decorator { child: None, .. } => {
                    return Err(BuildError::MissingChild {
                        node: node.name.clone(),
                        node_type: node.type_name(),
                    });
                }
                NodeKind::Composite { children, .. } if children.is_empty() => {
                    return Err(BuildError::EmptyComposite {
                        node: node.name.clone(),
                        node_type: node.type_name(),
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Id of the owning parent, if this node has been attached to one.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Status reported by the most recent completed tick, `None` before the
    /// first tick or after [`reset`](Self::reset).
    pub fn last_status(&self) -> Option<Status> {
        self.last_status
    }

    pub fn shape(&self) -> Shape {
        match self.kind {
            NodeKind::Action(_) | NodeKind::Condition(_) => Shape::Leaf,
            NodeKind::Decorator { .. } => Shape::Decorator,
            NodeKind::Composite { .. } => Shape::Composite,
        }
    }

    /// Name of the behaviour type backing this node.
    pub fn type_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::Action(action) => action.type_name(),
            NodeKind::Condition(condition) => condition.type_name(),
            NodeKind::Decorator { behavior, .. } => behavior.type_name(),
            NodeKind::Composite { behavior, .. } => behavior.type_name(),
        }
    }

    /// Owned children in declared order. Leaves return an empty slice and
    /// decorators at most one node.
    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Action(_) | NodeKind::Condition(_) => &[],
            NodeKind::Decorator { child, .. } => {
                child.as_deref().map(std::slice::from_ref).unwrap_or(&[])
            }
            NodeKind::Composite { children, .. } => children,
        }
    }

    /// The single child of a decorator.
    pub fn child(&self) -> Option<&Node> {
        match &self.kind {
            NodeKind::Decorator { child, .. } => child.as_deref(),
            _ => None,
        }
    }

    /// Depth-first, pre-order traversal yielding `(depth, node)` pairs.
    /// The node itself is yielded first at depth 0.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![(0, self)],
        }
    }

    /// Finds a node in this subtree by id.
    pub fn find(&self, id: NodeId) -> Option<&Node> {
        self.walk().map(|(_, node)| node).find(|node| node.id == id)
    }

    /// Height of the subtree; a lone leaf has depth 1.
    pub fn depth(&self) -> usize {
        self.walk().map(|(depth, _)| depth + 1).max().unwrap_or(1)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("type", &self.type_name())
            .field("last_status", &self.last_status)
            .field("children", &self.children())
            .finish()
    }
}

/// Iterator returned by [`Node::walk`].
pub struct Walk<'a> {
    stack: Vec<(usize, &'a Node)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.children().iter().rev().map(|child| (depth + 1, child)));
        Some((depth, node))
    }
}
