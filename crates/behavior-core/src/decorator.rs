//! Decorator behavior nodes.
//!
//! Decorators wrap a single child and modify its result or control how
//! often and how long it runs. This module provides [`Inverter`] (NOT
//! logic), [`AlwaysSucceed`] / [`AlwaysFail`] (result forcing), the looping
//! decorators [`Repeater`], [`UntilSuccess`], [`UntilFailure`], and
//! [`Retry`], plus [`Timeout`] and [`Conditional`].
//!
//! Counters are private to each decorator instance. They survive across
//! ticks while the decorator reports `Running` and go back to zero as soon
//! as it reports a terminal status.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::{Result, TickError};
use crate::{Blackboard, Condition, Decorate, Node, Status};

/// Inverts the result of its child.
///
/// # Semantics
///
/// - If the child returns `Success`, the inverter returns `Failure`
/// - If the child returns `Failure`, the inverter returns `Success`
/// - `Running` passes through unchanged
///
/// This is analogous to a logical NOT (!) operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inverter;

#[async_trait]
impl Decorate for Inverter {
    async fn decorate(&mut self, child: &mut Node, blackboard: &Blackboard) -> Result<Status> {
        Ok(child.tick(blackboard).await?.invert())
    }

    fn type_name(&self) -> &'static str {
        "Inverter"
    }
}

/// Returns `Success` whenever the child finishes, regardless of its result.
///
/// Useful for optional behaviors that shouldn't cause a sequence to fail.
/// `Running` passes through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysSucceed;

#[async_trait]
impl Decorate for AlwaysSucceed {
    async fn decorate(&mut self, child: &mut Node, blackboard: &Blackboard) -> Result<Status> {
        Ok(match child.tick(blackboard).await? {
            Status::Running => Status::Running,
            Status::Success | Status::Failure => Status::Success,
        })
    }

    fn type_name(&self) -> &'static str {
        "AlwaysSucceed"
    }
}

/// Returns `Failure` whenever the child finishes, regardless of its result.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysFail;

#[async_trait]
impl Decorate for AlwaysFail {
    async fn decorate(&mut self, child: &mut Node, blackboard: &Blackboard) -> Result<Status> {
        Ok(match child.tick(blackboard).await? {
            Status::Running => Status::Running,
            Status::Success | Status::Failure => Status::Failure,
        })
    }

    fn type_name(&self) -> &'static str {
        "AlwaysFail"
    }
}

/// Runs its child to completion `count` times, one child tick per tick.
///
/// # Semantics
///
/// - Child `Success` counts one completion; the repeater returns `Running`
///   until `count` completions are reached, then `Success`
/// - Child `Running` → `Running` (nothing counted)
/// - Child `Failure` → `Failure`, abandoning the current cycle
///
/// The counter resets on every terminal result, so the next tick starts a
/// fresh cycle.
#[derive(Debug, Clone, Copy)]
pub struct Repeater {
    count: NonZeroU32,
    completed: u32,
}

impl Repeater {
    pub fn new(count: NonZeroU32) -> Self {
        Self {
            count,
            completed: 0,
        }
    }

    /// Completions counted in the current cycle.
    pub fn completed(&self) -> u32 {
        self.completed
    }
}

#[async_trait]
impl Decorate for Repeater {
    async fn decorate(&mut self, child: &mut Node, blackboard: &Blackboard) -> Result<Status> {
        match child.tick(blackboard).await? {
            Status::Running => Ok(Status::Running),
            Status::Failure => {
                self.completed = 0;
                Ok(Status::Failure)
            }
            Status::Success => {
                self.completed += 1;
                if self.completed < self.count.get() {
                    return Ok(Status::Running);
                }
                tracing::debug!(node = %child.name(), count = self.count.get(), "repeat cycle complete");
                self.completed = 0;
                Ok(Status::Success)
            }
        }
    }

    fn reset(&mut self) {
        self.completed = 0;
    }

    fn type_name(&self) -> &'static str {
        "Repeater"
    }
}

/// Re-ticks its child across ticks until it succeeds or attempts run out.
///
/// # Semantics
///
/// - Child `Success` → `Success`
/// - Child `Failure` → one attempt used; `Running` while attempts remain,
///   `Failure` once `max_attempts` failures have been seen
/// - Child `Running` → `Running` (no attempt used)
#[derive(Debug, Clone, Copy)]
pub struct UntilSuccess {
    max_attempts: NonZeroU32,
    attempts: u32,
}

impl UntilSuccess {
    pub fn new(max_attempts: NonZeroU32) -> Self {
        Self {
            max_attempts,
            attempts: 0,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

#[async_trait]
impl Decorate for UntilSuccess {
    async fn decorate(&mut self, child: &mut Node, blackboard: &Blackboard) -> Result<Status> {
        Ok(until(
            &mut self.attempts,
            self.max_attempts,
            child.tick(blackboard).await?,
            Status::Success,
        ))
    }

    fn reset(&mut self) {
        self.attempts = 0;
    }

    fn type_name(&self) -> &'static str {
        "UntilSuccess"
    }
}

/// Re-ticks its child across ticks until it fails or attempts run out.
///
/// The mirror image of [`UntilSuccess`]: the loop's goal is a child
/// `Failure`, which the decorator reports as `Success`. After
/// `max_attempts` child successes without a failure it gives up with
/// `Failure`.
#[derive(Debug, Clone, Copy)]
pub struct UntilFailure {
    max_attempts: NonZeroU32,
    attempts: u32,
}

impl UntilFailure {
    pub fn new(max_attempts: NonZeroU32) -> Self {
        Self {
            max_attempts,
            attempts: 0,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

#[async_trait]
impl Decorate for UntilFailure {
    async fn decorate(&mut self, child: &mut Node, blackboard: &Blackboard) -> Result<Status> {
        Ok(until(
            &mut self.attempts,
            self.max_attempts,
            child.tick(blackboard).await?,
            Status::Failure,
        ))
    }

    fn reset(&mut self) {
        self.attempts = 0;
    }

    fn type_name(&self) -> &'static str {
        "UntilFailure"
    }
}

// Shared attempt bookkeeping for the `Until*` decorators.
fn until(attempts: &mut u32, max: NonZeroU32, child: Status, goal: Status) -> Status {
    if child.is_running() {
        return Status::Running;
    }
    if child == goal {
        *attempts = 0;
        return Status::Success;
    }
    *attempts += 1;
    if *attempts < max.get() {
        return Status::Running;
    }
    *attempts = 0;
    Status::Failure
}

/// Re-ticks a failing child within the same tick, up to `max_attempts` times.
///
/// # Semantics
///
/// - Child `Success` → `Success`
/// - Child `Running` → `Running`; attempts used so far are kept for the next tick
/// - Child `Failure` → tick the child again immediately, until attempts run out
///   (then `Failure`)
///
/// With [`catching_faults`](Self::catching_faults), a child fault is logged
/// and counted as a failed attempt instead of propagating. Without it,
/// faults propagate like everywhere else.
#[derive(Debug, Clone, Copy)]
pub struct Retry {
    max_attempts: NonZeroU32,
    catch_faults: bool,
    attempts: u32,
}

impl Retry {
    pub fn new(max_attempts: NonZeroU32) -> Self {
        Self {
            max_attempts,
            catch_faults: false,
            attempts: 0,
        }
    }

    /// Treat child faults as failed attempts.
    pub fn catching_faults(mut self) -> Self {
        self.catch_faults = true;
        self
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

#[async_trait]
impl Decorate for Retry {
    async fn decorate(&mut self, child: &mut Node, blackboard: &Blackboard) -> Result<Status> {
        loop {
            match child.tick(blackboard).await {
                Ok(Status::Success) => {
                    self.attempts = 0;
                    return Ok(Status::Success);
                }
                Ok(Status::Running) => return Ok(Status::Running),
                Ok(Status::Failure) => {}
                Err(TickError::LeafFault { node, source }) if self.catch_faults => {
                    tracing::warn!(%node, error = %source, attempt = self.attempts + 1, "retrying after fault");
                }
                Err(err) => {
                    self.attempts = 0;
                    return Err(err);
                }
            }

            self.attempts += 1;
            if self.attempts >= self.max_attempts.get() {
                tracing::debug!(node = %child.name(), attempts = self.attempts, "retries exhausted");
                self.attempts = 0;
                return Ok(Status::Failure);
            }
        }
    }

    fn reset(&mut self) {
        self.attempts = 0;
    }

    fn type_name(&self) -> &'static str {
        "Retry"
    }
}

/// Fails a child that keeps running past a time limit.
///
/// The clock starts on the first tick of a cycle. A tick that finds the
/// limit already elapsed does not tick the child again: it resets the
/// child's subtree and returns `Failure`. Any terminal child result stops
/// the clock.
#[derive(Debug, Clone, Copy)]
pub struct Timeout {
    limit: Duration,
    started: Option<Instant>,
}

impl Timeout {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            started: None,
        }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }
}

#[async_trait]
impl Decorate for Timeout {
    async fn decorate(&mut self, child: &mut Node, blackboard: &Blackboard) -> Result<Status> {
        let started = *self.started.get_or_insert_with(Instant::now);
        if started.elapsed() >= self.limit {
            tracing::debug!(node = %child.name(), limit = ?self.limit, "timed out");
            self.started = None;
            child.reset();
            return Ok(Status::Failure);
        }

        let status = child.tick(blackboard).await?;
        if status.is_terminal() {
            self.started = None;
        }
        Ok(status)
    }

    fn reset(&mut self) {
        self.started = None;
    }

    fn type_name(&self) -> &'static str {
        "Timeout"
    }
}

/// Gates its child behind a [`Condition`].
///
/// When the condition is false the child is not ticked and the decorator
/// returns `Failure`. A condition error is reported as a fault named after
/// the condition's type.
pub struct Conditional {
    condition: Box<dyn Condition>,
}

impl Conditional {
    pub fn new(condition: impl Condition + 'static) -> Self {
        Self {
            condition: Box::new(condition),
        }
    }
}

#[async_trait]
impl Decorate for Conditional {
    async fn decorate(&mut self, child: &mut Node, blackboard: &Blackboard) -> Result<Status> {
        let open = self
            .condition
            .evaluate(blackboard)
            .map_err(|source| TickError::leaf_fault(self.condition.type_name(), source))?;
        if !open {
            return Ok(Status::Failure);
        }
        child.tick(blackboard).await
    }

    fn type_name(&self) -> &'static str {
        "Conditional"
    }
}
