//! Builder utilities for ergonomic behavior tree construction.
//!
//! This module provides helper functions to reduce boilerplate when building
//! trees in code. Instead of writing `Node::composite(name, Sequence, vec![...])`,
//! you can use shorter functions like `sequence(name, vec![...])`.
//!
//! Helpers taking a count accept a plain `u32` and report zero as a
//! [`BuildError::ZeroCount`] naming the node.

use std::num::NonZeroU32;
use std::time::Duration;

use crate::error::BuildError;
use crate::{
    AlwaysFail, AlwaysSucceed, Condition, Conditional, Inverter, MemorySelector, MemorySequence,
    Node, Parallel, Policy, Repeater, Retry, Selector, Sequence, Timeout, UntilFailure,
    UntilSuccess,
};

type BuildResult = Result<Node, BuildError>;

/// Creates a sequence node.
#[inline]
pub fn sequence(name: impl Into<String>, children: Vec<Node>) -> BuildResult {
    Node::composite(name, Sequence, children)
}

/// Creates a selector node.
#[inline]
pub fn selector(name: impl Into<String>, children: Vec<Node>) -> BuildResult {
    Node::composite(name, Selector, children)
}

/// Creates a sequence that resumes at its running child.
#[inline]
pub fn memory_sequence(name: impl Into<String>, children: Vec<Node>) -> BuildResult {
    Node::composite(name, MemorySequence::default(), children)
}

/// Creates a selector that resumes at its running child.
#[inline]
pub fn memory_selector(name: impl Into<String>, children: Vec<Node>) -> BuildResult {
    Node::composite(name, MemorySelector::default(), children)
}

/// Creates a parallel node.
pub fn parallel(
    name: impl Into<String>,
    success_policy: Policy,
    failure_policy: Policy,
    children: Vec<Node>,
) -> BuildResult {
    Node::composite(name, Parallel::new(success_policy, failure_policy)?, children)
}

/// Creates an inverter node.
#[inline]
pub fn inverter(name: impl Into<String>, child: Node) -> Node {
    Node::decorator(name, Inverter, child)
}

/// Creates an always-succeed node.
#[inline]
pub fn always_succeed(name: impl Into<String>, child: Node) -> Node {
    Node::decorator(name, AlwaysSucceed, child)
}

/// Creates an always-fail node.
#[inline]
pub fn always_fail(name: impl Into<String>, child: Node) -> Node {
    Node::decorator(name, AlwaysFail, child)
}

/// Creates a repeater that completes its child `count` times.
pub fn repeater(name: impl Into<String>, count: u32, child: Node) -> BuildResult {
    let name = name.into();
    let count = non_zero(&name, "Repeater", "count", count)?;
    Ok(Node::decorator(name, Repeater::new(count), child))
}

/// Creates an until-success node.
pub fn until_success(name: impl Into<String>, max_attempts: u32, child: Node) -> BuildResult {
    let name = name.into();
    let max = non_zero(&name, "UntilSuccess", "max_attempts", max_attempts)?;
    Ok(Node::decorator(name, UntilSuccess::new(max), child))
}

/// Creates an until-failure node.
pub fn until_failure(name: impl Into<String>, max_attempts: u32, child: Node) -> BuildResult {
    let name = name.into();
    let max = non_zero(&name, "UntilFailure", "max_attempts", max_attempts)?;
    Ok(Node::decorator(name, UntilFailure::new(max), child))
}

/// Creates a retry node.
pub fn retry(name: impl Into<String>, max_attempts: u32, child: Node) -> BuildResult {
    let name = name.into();
    let max = non_zero(&name, "Retry", "max_attempts", max_attempts)?;
    Ok(Node::decorator(name, Retry::new(max), child))
}

/// Creates a timeout node.
#[inline]
pub fn timeout(name: impl Into<String>, limit: Duration, child: Node) -> Node {
    Node::decorator(name, Timeout::new(limit), child)
}

/// Creates a node that only ticks `child` while `condition` holds.
#[inline]
pub fn conditional(
    name: impl Into<String>,
    condition: impl Condition + 'static,
    child: Node,
) -> Node {
    Node::decorator(name, Conditional::new(condition), child)
}

pub(crate) fn non_zero(
    name: &str,
    node_type: &'static str,
    field: &'static str,
    value: u32,
) -> Result<NonZeroU32, BuildError> {
    NonZeroU32::new(value).ok_or_else(|| BuildError::ZeroCount {
        node: name.to_owned(),
        node_type,
        field,
    })
}
