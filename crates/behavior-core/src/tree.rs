//! The tree orchestrator: one root, one blackboard, one `tick()` entry point.
//!
//! The driver decides the cadence; [`BehaviorTree::tick`] walks the tree once
//! per call and returns the root's status.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized --bind()--> Ready --tick()--> Ready --tick()--> ...
//! ```
//!
//! Ticking an uninitialized tree is an error. Rebinding a ready tree swaps
//! in the new root and blackboard while keeping the tick counter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::time::Instant;
use tracing::Instrument;

use crate::config::TreeConfig;
use crate::error::{BuildError, Result, TickError};
use crate::{Action, Blackboard, Node, Status};

/// Lifecycle state of a [`BehaviorTree`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TreeState {
    /// No root bound yet.
    Uninitialized,
    /// Root bound; `tick()` may be called.
    Ready,
}

/// Owns a root node and its blackboard and ticks them on request.
///
/// # Concurrency
///
/// `tick()` takes `&mut self`, so one tree is never ticked twice at once.
/// Children of a `Parallel` node are still driven concurrently within a
/// tick and share the blackboard through its internal lock.
#[derive(Debug)]
pub struct BehaviorTree {
    config: TreeConfig,
    root: Option<Node>,
    blackboard: Blackboard,
    tick_count: u64,
    last_tick_time: Option<DateTime<Utc>>,
    last_status: Option<Status>,
}

impl BehaviorTree {
    /// Creates an uninitialized tree.
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            root: None,
            blackboard: Blackboard::new(),
            tick_count: 0,
            last_tick_time: None,
            last_status: None,
        }
    }

    /// Creates a ready tree around `root` with an empty blackboard.
    ///
    /// # Errors
    ///
    /// See [`bind`](Self::bind).
    pub fn with_root(config: TreeConfig, root: Node) -> std::result::Result<Self, BuildError> {
        let mut tree = Self::new(config);
        tree.bind(root, Blackboard::new())?;
        Ok(tree)
    }

    /// Binds a root and blackboard, moving the tree to [`TreeState::Ready`].
    ///
    /// The tree is validated first; on error the previous binding is kept.
    ///
    /// # Errors
    ///
    /// - [`BuildError::MissingChild`] / [`BuildError::EmptyComposite`] for
    ///   open child slots
    /// - [`BuildError::TooDeep`] if the tree exceeds `max_depth`
    pub fn bind(&mut self, root: Node, blackboard: Blackboard) -> std::result::Result<(), BuildError> {
        root.validate()?;
        let depth = root.depth();
        if depth > self.config.max_depth {
            return Err(BuildError::TooDeep {
                depth,
                max: self.config.max_depth,
            });
        }

        tracing::debug!(
            tree = %self.config.name,
            root = %root.name(),
            depth,
            nodes = root.walk().count(),
            "bound tree"
        );
        self.root = Some(root);
        self.blackboard = blackboard;
        self.last_status = None;
        Ok(())
    }

    /// Ticks the root once against the owned blackboard.
    ///
    /// On success the tick counter grows by one and the tick time is
    /// recorded, whatever status the root returned.
    ///
    /// # Errors
    ///
    /// - [`TickError::Uninitialized`] if no root is bound
    /// - [`TickError::LeafFault`] if a leaf faulted; the tick is not counted
    pub async fn tick(&mut self) -> Result<Status> {
        let root = self.root.as_mut().ok_or(TickError::Uninitialized)?;
        let tick = self.tick_count + 1;
        let span = tracing::debug_span!("tick", tree = %self.config.name, tick);
        let started = Instant::now();

        let outcome = root.tick(&self.blackboard).instrument(span).await;
        let elapsed = started.elapsed();

        if let Some(threshold) = self.config.slow_tick_threshold
            && elapsed > threshold
        {
            tracing::warn!(tree = %self.config.name, tick, ?elapsed, ?threshold, "slow tick");
        }

        let status = match outcome {
            Ok(status) => status,
            Err(err) => {
                tracing::warn!(tree = %self.config.name, tick, error = %err, node = ?err.node(), "tick faulted");
                return Err(err);
            }
        };

        self.tick_count = tick;
        self.last_tick_time = Some(Utc::now());
        self.last_status = Some(status);
        tracing::debug!(tree = %self.config.name, tick, %status, "tick complete");
        Ok(status)
    }

    /// Clears private run-state across the whole tree. The blackboard and
    /// the tick counter are left alone.
    pub fn reset(&mut self) {
        if let Some(root) = self.root.as_mut() {
            root.reset();
        }
        self.last_status = None;
    }

    pub fn state(&self) -> TreeState {
        if self.root.is_some() {
            TreeState::Ready
        } else {
            TreeState::Uninitialized
        }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    /// Number of successful `tick()` calls.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Wall-clock time of the last successful tick.
    pub fn last_tick_time(&self) -> Option<DateTime<Utc>> {
        self.last_tick_time
    }

    pub fn last_status(&self) -> Option<Status> {
        self.last_status
    }
}

/// A whole tree can be mounted as a leaf of another tree.
///
/// The inner tree ticks against its own blackboard; the outer blackboard is
/// not visible to it. Bridging values between the two is up to the host.
/// An inner fault surfaces unchanged, still naming the inner leaf.
#[async_trait]
impl Action for BehaviorTree {
    async fn execute(&mut self, _blackboard: &Blackboard) -> anyhow::Result<Status> {
        Ok(self.tick().await?)
    }

    fn reset(&mut self) {
        BehaviorTree::reset(self);
    }

    fn type_name(&self) -> &'static str {
        "Subtree"
    }
}
