//! Composite behavior nodes.
//!
//! Composite nodes control the execution flow of multiple children. This
//! module provides the fundamental building blocks for creating complex
//! decision trees: [`Sequence`] (AND logic), [`Selector`] (OR logic), and
//! [`Parallel`] (concurrent fan-out), plus the explicitly-named memory
//! variants [`MemorySequence`] and [`MemorySelector`].

use async_trait::async_trait;
use futures::future::join_all;

use crate::error::{BuildError, Result};
use crate::{Blackboard, Compose, Node, Policy, Status};

/// Executes children in order until one does not succeed.
///
/// # Semantics
///
/// Every tick starts again at the first child:
/// - If a child returns `Failure`, the sequence **stops immediately** and returns `Failure`
/// - If a child returns `Running`, the sequence **stops immediately** and returns `Running`
/// - If a child returns `Success`, the sequence **continues** to the next child
/// - If all children return `Success`, the sequence returns `Success`
///
/// This is analogous to a short-circuited logical AND (&&) operation.
/// Children after the stopping point are not ticked.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequence;

#[async_trait]
impl Compose for Sequence {
    async fn compose(&mut self, children: &mut [Node], blackboard: &Blackboard) -> Result<Status> {
        for child in children.iter_mut() {
            match child.tick(blackboard).await? {
                Status::Success => continue,
                other => return Ok(other), // Short-circuit
            }
        }
        Ok(Status::Success)
    }

    fn type_name(&self) -> &'static str {
        "Sequence"
    }
}

/// Executes children in order until one does not fail.
///
/// # Semantics
///
/// Every tick starts again at the first child:
/// - If a child returns `Success` or `Running`, the selector **stops immediately** and returns it
/// - If a child returns `Failure`, the selector **continues** to the next child
/// - If all children return `Failure`, the selector returns `Failure`
///
/// This is analogous to a short-circuited logical OR (||) operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Selector;

#[async_trait]
impl Compose for Selector {
    async fn compose(&mut self, children: &mut [Node], blackboard: &Blackboard) -> Result<Status> {
        for child in children.iter_mut() {
            match child.tick(blackboard).await? {
                Status::Failure => continue,
                other => return Ok(other), // Short-circuit
            }
        }
        Ok(Status::Failure)
    }

    fn type_name(&self) -> &'static str {
        "Selector"
    }
}

/// Ticks every child every tick and aggregates the results.
///
/// # Semantics
///
/// Children are driven concurrently on the current task; aggregation runs
/// only after every child has finished its tick. Two thresholds are checked
/// against the same set of results:
///
/// 1. If the failure policy is met → `Failure`
/// 2. Else if the success policy is met → `Success`
/// 3. Else → `Running`
///
/// Failure is checked first, so a fail-fast configuration wins over a
/// simultaneous success from other children.
///
/// If any child faults, the first fault in child order is returned after all
/// children have completed.
#[derive(Debug, Clone, Copy)]
pub struct Parallel {
    success_policy: Policy,
    failure_policy: Policy,
}

impl Parallel {
    /// Creates a parallel node with the given thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidPolicy`] if a failure policy is passed as
    /// the success policy or vice versa.
    pub fn new(
        success_policy: Policy,
        failure_policy: Policy,
    ) -> std::result::Result<Self, BuildError> {
        if !success_policy.is_success_policy() {
            return Err(BuildError::InvalidPolicy {
                node_type: "Parallel",
                policy: success_policy,
                role: "success",
            });
        }
        if !failure_policy.is_failure_policy() {
            return Err(BuildError::InvalidPolicy {
                node_type: "Parallel",
                policy: failure_policy,
                role: "failure",
            });
        }
        Ok(Self {
            success_policy,
            failure_policy,
        })
    }

    pub fn success_policy(&self) -> Policy {
        self.success_policy
    }

    pub fn failure_policy(&self) -> Policy {
        self.failure_policy
    }

    /// Combines child results per the configured thresholds.
    pub fn aggregate(&self, results: &[Status]) -> Status {
        let total = results.len();
        let successes = results.iter().filter(|s| s.is_success()).count();
        let failures = results.iter().filter(|s| s.is_failure()).count();

        if self.failure_policy.is_met(successes, failures, total) {
            Status::Failure
        } else if self.success_policy.is_met(successes, failures, total) {
            Status::Success
        } else {
            Status::Running
        }
    }
}

#[async_trait]
impl Compose for Parallel {
    async fn compose(&mut self, children: &mut [Node], blackboard: &Blackboard) -> Result<Status> {
        let outcomes = join_all(children.iter_mut().map(|child| child.tick(blackboard))).await;
        let results = outcomes.into_iter().collect::<Result<Vec<_>>>()?;
        Ok(self.aggregate(&results))
    }

    fn type_name(&self) -> &'static str {
        "Parallel"
    }
}

/// A sequence that resumes at the child that last returned `Running`.
///
/// Unlike [`Sequence`], children that already succeeded are not re-ticked
/// while a later child is still running. The remembered index resets to the
/// first child on any terminal result and on [`reset`](Compose::reset).
#[derive(Debug, Clone, Copy, Default)]
pub struct MemorySequence {
    index: usize,
}

impl MemorySequence {
    /// Index of the child the next tick resumes at.
    pub fn resume_index(&self) -> usize {
        self.index
    }
}

#[async_trait]
impl Compose for MemorySequence {
    async fn compose(&mut self, children: &mut [Node], blackboard: &Blackboard) -> Result<Status> {
        while let Some(child) = children.get_mut(self.index) {
            match child.tick(blackboard).await? {
                Status::Success => self.index += 1,
                Status::Running => return Ok(Status::Running),
                Status::Failure => {
                    self.index = 0;
                    return Ok(Status::Failure);
                }
            }
        }
        self.index = 0;
        Ok(Status::Success)
    }

    fn reset(&mut self) {
        self.index = 0;
    }

    fn type_name(&self) -> &'static str {
        "MemorySequence"
    }
}

/// A selector that resumes at the child that last returned `Running`.
///
/// Earlier children that already failed are not re-ticked while a later
/// child is still running.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemorySelector {
    index: usize,
}

impl MemorySelector {
    /// Index of the child the next tick resumes at.
    pub fn resume_index(&self) -> usize {
        self.index
    }
}

#[async_trait]
impl Compose for MemorySelector {
    async fn compose(&mut self, children: &mut [Node], blackboard: &Blackboard) -> Result<Status> {
        while let Some(child) = children.get_mut(self.index) {
            match child.tick(blackboard).await? {
                Status::Failure => self.index += 1,
                Status::Running => return Ok(Status::Running),
                Status::Success => {
                    self.index = 0;
                    return Ok(Status::Success);
                }
            }
        }
        self.index = 0;
        Ok(Status::Failure)
    }

    fn reset(&mut self) {
        self.index = 0;
    }

    fn type_name(&self) -> &'static str {
        "MemorySelector"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Always, FailWith, Script, ticks};

    fn script(name: &str, statuses: &[Status]) -> (Node, std::sync::Arc<std::sync::atomic::AtomicUsize>) {
        let (leaf, counter) = Script::new(statuses.iter().copied());
        (Node::action(name, leaf), counter)
    }

    struct Increment;

    #[async_trait]
    impl crate::Action for Increment {
        async fn execute(&mut self, bb: &Blackboard) -> anyhow::Result<Status> {
            bb.update("value", |v: Option<i32>| v.unwrap_or(0) + 1);
            Ok(Status::Success)
        }
    }

    #[tokio::test]
    async fn sequence_all_success() {
        let bb = Blackboard::new();
        let mut seq = Node::composite(
            "seq",
            Sequence,
            vec![Node::action("a", Increment), Node::action("b", Increment)],
        )
        .unwrap();

        assert_eq!(seq.tick(&bb).await.unwrap(), Status::Success);
        assert_eq!(bb.get::<i32>("value"), Some(2));
    }

    #[tokio::test]
    async fn sequence_fails_on_first_failure() {
        let bb = Blackboard::new();
        let (third, third_ticks) = script("c", &[Status::Success]);
        let mut seq = Node::composite(
            "seq",
            Sequence,
            vec![
                Node::action("a", Increment),
                Node::action("b", Always(Status::Failure)),
                third, // Should not execute
            ],
        )
        .unwrap();

        assert_eq!(seq.tick(&bb).await.unwrap(), Status::Failure);
        assert_eq!(bb.get::<i32>("value"), Some(1));
        assert_eq!(ticks(&third_ticks), 0);
    }

    #[tokio::test]
    async fn sequence_stops_at_running_and_restarts_from_first_child() {
        let bb = Blackboard::new();
        let (first, first_ticks) = script("a", &[Status::Success]);
        let (third, third_ticks) = script("c", &[Status::Success]);
        let mut seq = Node::composite(
            "seq",
            Sequence,
            vec![first, Node::action("b", Always(Status::Running)), third],
        )
        .unwrap();

        assert_eq!(seq.tick(&bb).await.unwrap(), Status::Running);
        assert_eq!(seq.tick(&bb).await.unwrap(), Status::Running);
        assert_eq!(ticks(&first_ticks), 2);
        assert_eq!(ticks(&third_ticks), 0);
    }

    #[tokio::test]
    async fn selector_succeeds_on_first_success() {
        let bb = Blackboard::new();
        let (third, third_ticks) = script("c", &[Status::Failure]);
        let mut sel = Node::composite(
            "sel",
            Selector,
            vec![
                Node::action("a", Always(Status::Failure)),
                Node::action("b", Increment),
                third,
            ],
        )
        .unwrap();

        assert_eq!(sel.tick(&bb).await.unwrap(), Status::Success);
        assert_eq!(bb.get::<i32>("value"), Some(1));
        assert_eq!(ticks(&third_ticks), 0);
    }

    #[tokio::test]
    async fn selector_fails_when_all_fail() {
        let bb = Blackboard::new();
        let mut sel = Node::composite(
            "sel",
            Selector,
            vec![
                Node::action("a", Always(Status::Failure)),
                Node::action("b", Always(Status::Failure)),
            ],
        )
        .unwrap();

        assert_eq!(sel.tick(&bb).await.unwrap(), Status::Failure);
    }

    #[test]
    fn parallel_rejects_swapped_policies() {
        assert!(matches!(
            Parallel::new(Policy::OneFails, Policy::AllFail),
            Err(BuildError::InvalidPolicy { role: "success", .. })
        ));
        assert!(matches!(
            Parallel::new(Policy::AllSucceed, Policy::OneSucceeds),
            Err(BuildError::InvalidPolicy { role: "failure", .. })
        ));
    }

    #[test]
    fn parallel_checks_failure_first() {
        let par = Parallel::new(Policy::AllSucceed, Policy::OneFails).unwrap();
        assert_eq!(
            par.aggregate(&[Status::Success, Status::Failure, Status::Running]),
            Status::Failure
        );

        let par = Parallel::new(Policy::OneSucceeds, Policy::OneFails).unwrap();
        assert_eq!(par.aggregate(&[Status::Success, Status::Failure]), Status::Failure);
    }

    #[test]
    fn parallel_one_succeeds_all_fail() {
        let par = Parallel::new(Policy::OneSucceeds, Policy::AllFail).unwrap();
        assert_eq!(
            par.aggregate(&[Status::Failure, Status::Failure, Status::Success]),
            Status::Success
        );
        assert_eq!(par.aggregate(&[Status::Failure, Status::Failure]), Status::Failure);
        assert_eq!(par.aggregate(&[Status::Failure, Status::Running]), Status::Running);
    }

    #[tokio::test]
    async fn parallel_ticks_every_child() {
        let bb = Blackboard::new();
        let (a, a_ticks) = script("a", &[Status::Failure]);
        let (b, b_ticks) = script("b", &[Status::Success]);
        let (c, c_ticks) = script("c", &[Status::Running]);
        let mut par = Node::composite(
            "par",
            Parallel::new(Policy::AllSucceed, Policy::OneFails).unwrap(),
            vec![a, b, c],
        )
        .unwrap();

        assert_eq!(par.tick(&bb).await.unwrap(), Status::Failure);
        assert_eq!((ticks(&a_ticks), ticks(&b_ticks), ticks(&c_ticks)), (1, 1, 1));
    }

    #[tokio::test]
    async fn parallel_runs_all_children_before_reporting_fault() {
        let bb = Blackboard::new();
        let (after, after_ticks) = script("after", &[Status::Success]);
        let mut par = Node::composite(
            "par",
            Parallel::new(Policy::AllSucceed, Policy::OneFails).unwrap(),
            vec![Node::action("boom", FailWith("sensor offline")), after],
        )
        .unwrap();

        let err = par.tick(&bb).await.unwrap_err();
        assert_eq!(err.node(), Some("boom"));
        assert_eq!(ticks(&after_ticks), 1);
    }

    #[tokio::test]
    async fn memory_sequence_resumes_at_running_child() {
        let bb = Blackboard::new();
        let (first, first_ticks) = script("a", &[Status::Success]);
        let (second, second_ticks) = script("b", &[Status::Running, Status::Success]);
        let mut seq = Node::composite("mseq", MemorySequence::default(), vec![first, second]).unwrap();

        assert_eq!(seq.tick(&bb).await.unwrap(), Status::Running);
        assert_eq!(seq.tick(&bb).await.unwrap(), Status::Success);
        assert_eq!(ticks(&first_ticks), 1);
        assert_eq!(ticks(&second_ticks), 2);

        // Terminal result starts the next cycle from the first child.
        assert_eq!(seq.tick(&bb).await.unwrap(), Status::Success);
        assert_eq!(ticks(&first_ticks), 2);
    }

    #[tokio::test]
    async fn memory_selector_resumes_at_running_child() {
        let bb = Blackboard::new();
        let (first, first_ticks) = script("a", &[Status::Failure]);
        let (second, _) = script("b", &[Status::Running, Status::Failure]);
        let mut sel = Node::composite("msel", MemorySelector::default(), vec![first, second]).unwrap();

        assert_eq!(sel.tick(&bb).await.unwrap(), Status::Running);
        assert_eq!(sel.tick(&bb).await.unwrap(), Status::Failure);
        assert_eq!(ticks(&first_ticks), 1);
    }

    #[tokio::test]
    async fn reset_rewinds_memory_sequence() {
        let bb = Blackboard::new();
        let (first, first_ticks) = script("a", &[Status::Success]);
        let mut seq = Node::composite(
            "mseq",
            MemorySequence::default(),
            vec![first, Node::action("b", Always(Status::Running))],
        )
        .unwrap();

        assert_eq!(seq.tick(&bb).await.unwrap(), Status::Running);
        seq.reset();
        assert_eq!(seq.tick(&bb).await.unwrap(), Status::Running);
        assert_eq!(ticks(&first_ticks), 2);
    }
}
