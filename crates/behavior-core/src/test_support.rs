//! Leaves shared by the unit tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::{Action, Blackboard, Status};

/// Always returns the same status.
pub struct Always(pub Status);

#[async_trait]
impl Action for Always {
    async fn execute(&mut self, _blackboard: &Blackboard) -> anyhow::Result<Status> {
        Ok(self.0)
    }
}

/// Always faults with the given message.
pub struct FailWith(pub &'static str);

#[async_trait]
impl Action for FailWith {
    async fn execute(&mut self, _blackboard: &Blackboard) -> anyhow::Result<Status> {
        anyhow::bail!(self.0)
    }
}

/// Returns scripted statuses in order, repeating the last one, and counts
/// how often it was ticked.
pub struct Script {
    statuses: VecDeque<Status>,
    ticks: Arc<AtomicUsize>,
}

impl Script {
    pub fn new(statuses: impl IntoIterator<Item = Status>) -> (Self, Arc<AtomicUsize>) {
        let ticks = Arc::new(AtomicUsize::new(0));
        let script = Self {
            statuses: statuses.into_iter().collect(),
            ticks: Arc::clone(&ticks),
        };
        (script, ticks)
    }
}

#[async_trait]
impl Action for Script {
    async fn execute(&mut self, _blackboard: &Blackboard) -> anyhow::Result<Status> {
        self.ticks.fetch_add(1, Ordering::SeqCst);
        let status = if self.statuses.len() > 1 {
            self.statuses.pop_front()
        } else {
            self.statuses.front().copied()
        };
        Ok(status.unwrap_or(Status::Success))
    }
}

pub fn ticks(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}
