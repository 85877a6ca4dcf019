//! Ready-made leaves and closure adapters.
//!
//! Most hosts implement [`Action`] or [`Condition`] on their own types. The
//! adapters here cover the small cases: inline closures, constant results,
//! and blackboard checks.

use async_trait::async_trait;

use crate::{Action, Blackboard, Condition, Node, Status};

/// Adapts a synchronous closure into an [`Action`].
pub struct ActionFn<F> {
    f: F,
}

impl<F> ActionFn<F>
where
    F: FnMut(&Blackboard) -> anyhow::Result<Status> + Send,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> Action for ActionFn<F>
where
    F: FnMut(&Blackboard) -> anyhow::Result<Status> + Send,
{
    async fn execute(&mut self, blackboard: &Blackboard) -> anyhow::Result<Status> {
        (self.f)(blackboard)
    }

    fn type_name(&self) -> &'static str {
        "ActionFn"
    }
}

/// Adapts a predicate closure into a [`Condition`].
pub struct ConditionFn<F> {
    f: F,
}

impl<F> ConditionFn<F>
where
    F: Fn(&Blackboard) -> bool + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Condition for ConditionFn<F>
where
    F: Fn(&Blackboard) -> bool + Send + Sync,
{
    fn evaluate(&self, blackboard: &Blackboard) -> anyhow::Result<bool> {
        Ok((self.f)(blackboard))
    }

    fn type_name(&self) -> &'static str {
        "ConditionFn"
    }
}

impl Node {
    /// Creates an action leaf from a closure.
    pub fn action_fn<F>(name: impl Into<String>, f: F) -> Self
    where
        F: FnMut(&Blackboard) -> anyhow::Result<Status> + Send + 'static,
    {
        Node::action(name, ActionFn::new(f))
    }

    /// Creates a condition leaf from a predicate closure.
    pub fn condition_fn<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Blackboard) -> bool + Send + Sync + 'static,
    {
        Node::condition(name, ConditionFn::new(f))
    }
}

/// A leaf that always reports the same status.
#[derive(Debug, Clone, Copy)]
pub struct Constant(pub Status);

#[async_trait]
impl Action for Constant {
    async fn execute(&mut self, _blackboard: &Blackboard) -> anyhow::Result<Status> {
        Ok(self.0)
    }

    fn type_name(&self) -> &'static str {
        match self.0 {
            Status::Success => "Success",
            Status::Failure => "Failure",
            Status::Running => "Running",
        }
    }
}

/// True when the blackboard holds `true` under `key`.
///
/// A missing key or a non-`bool` value reads as `false`.
#[derive(Debug, Clone)]
pub struct BlackboardFlag {
    key: String,
}

impl BlackboardFlag {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Condition for BlackboardFlag {
    fn evaluate(&self, blackboard: &Blackboard) -> anyhow::Result<bool> {
        Ok(blackboard.get_or(&self.key, false))
    }

    fn type_name(&self) -> &'static str {
        "IsFlagSet"
    }
}

/// True when the blackboard holds any value under `key`.
#[derive(Debug, Clone)]
pub struct BlackboardHas {
    key: String,
}

impl BlackboardHas {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Condition for BlackboardHas {
    fn evaluate(&self, blackboard: &Blackboard) -> anyhow::Result<bool> {
        Ok(blackboard.has(&self.key))
    }

    fn type_name(&self) -> &'static str {
        "HasKey"
    }
}
