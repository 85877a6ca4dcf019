//! Tick-driven behavior tree engine.
//!
//! A host builds a tree of [`Node`]s, binds it to a [`BehaviorTree`] with a
//! shared [`Blackboard`], and calls [`BehaviorTree::tick`] at whatever cadence
//! it likes. Each tick walks the tree from the root and returns one
//! [`Status`].
//!
//! - **Three-valued status**: nodes report `Success`, `Failure`, or
//!   `Running` when their work spans several ticks
//! - **Async leaves**: [`Action`]s are `async` and may await I/O
//! - **Faults are not failures**: a leaf error propagates out of `tick()`
//!   with the leaf's name instead of being folded into `Failure`
//! - **Owned children**: parents own their children; back-references are
//!   plain [`NodeId`]s
//!
//! # Architecture
//!
//! - [`Node`]: identity, last status, and one of four behaviour shapes
//! - Leaf traits: [`Action`], [`Condition`]
//! - Composites ([`Compose`]): [`Sequence`], [`Selector`], [`Parallel`],
//!   [`MemorySequence`], [`MemorySelector`]
//! - Decorators ([`Decorate`]): [`Inverter`], [`AlwaysSucceed`],
//!   [`AlwaysFail`], [`Repeater`], [`UntilSuccess`], [`UntilFailure`],
//!   [`Retry`], [`Timeout`], [`Conditional`]
//! - [`NodeRegistry`]: builds nodes from a type name and attributes
//! - [`BehaviorTree`]: the orchestrator
//!
//! # Example
//!
//! ```
//! use behavior_core::builder::{inverter, sequence};
//! use behavior_core::{BehaviorTree, Node, Status, TreeConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let root = sequence(
//!     "patrol",
//!     vec![
//!         inverter("not_alarmed", Node::condition_fn("alarmed", |bb| bb.get_or("alarm", false))),
//!         Node::action_fn("step", |bb| {
//!             bb.update("steps", |n: Option<u32>| n.unwrap_or(0) + 1);
//!             Ok(Status::Success)
//!         }),
//!     ],
//! )
//! .unwrap();
//!
//! let mut tree = BehaviorTree::with_root(TreeConfig::new("guard"), root).unwrap();
//! assert_eq!(tree.tick().await.unwrap(), Status::Success);
//! assert_eq!(tree.blackboard().get::<u32>("steps"), Some(1));
//! # }
//! ```

pub mod blackboard;
pub mod builder;
pub mod composite;
pub mod config;
pub mod decorator;
pub mod error;
pub mod inspect;
pub mod leaf;
pub mod node;
pub mod registry;
pub mod status;
pub mod tree;

#[cfg(test)]
mod test_support;

// Re-export core types for ergonomic API
pub use blackboard::{Blackboard, Value};
pub use composite::{MemorySelector, MemorySequence, Parallel, Selector, Sequence};
pub use config::TreeConfig;
pub use decorator::{
    AlwaysFail, AlwaysSucceed, Conditional, Inverter, Repeater, Retry, Timeout, UntilFailure,
    UntilSuccess,
};
pub use error::{BuildError, Fault, Result, TickError};
pub use inspect::{NodeSnapshot, TreeSnapshot};
pub use leaf::{ActionFn, BlackboardFlag, BlackboardHas, ConditionFn, Constant};
pub use node::{Action, Compose, Condition, Decorate, Node, NodeId, Shape, Walk};
pub use registry::{Attributes, Constructor, NodeRegistry, NodeSpec};
pub use status::{Policy, Status};
pub use tree::{BehaviorTree, TreeState};
