//! Shared leaves and setup for integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use behavior_core::{Action, Blackboard, Status};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Returns `Running` for `running_ticks` ticks, then `outcome`, then starts
/// over. Counts every tick and every reset.
pub struct Countdown {
    running_ticks: usize,
    remaining: usize,
    outcome: Status,
    pub ticks: Arc<AtomicUsize>,
    pub resets: Arc<AtomicUsize>,
}

impl Countdown {
    pub fn new(running_ticks: usize, outcome: Status) -> Self {
        Self {
            running_ticks,
            remaining: running_ticks,
            outcome,
            ticks: Arc::default(),
            resets: Arc::default(),
        }
    }
}

#[async_trait]
impl Action for Countdown {
    async fn execute(&mut self, _blackboard: &Blackboard) -> anyhow::Result<Status> {
        self.ticks.fetch_add(1, Ordering::SeqCst);
        if self.remaining > 0 {
            self.remaining -= 1;
            return Ok(Status::Running);
        }
        self.remaining = self.running_ticks;
        Ok(self.outcome)
    }

    fn reset(&mut self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
        self.remaining = self.running_ticks;
    }

    fn type_name(&self) -> &'static str {
        "Countdown"
    }
}

/// Appends its label to the `trace` list on the blackboard, then returns a
/// fixed status.
pub struct Record {
    label: &'static str,
    status: Status,
}

impl Record {
    pub fn new(label: &'static str, status: Status) -> Self {
        Self { label, status }
    }
}

#[async_trait]
impl Action for Record {
    async fn execute(&mut self, blackboard: &Blackboard) -> anyhow::Result<Status> {
        let label = self.label;
        blackboard.update("trace", |trace: Option<Vec<&'static str>>| {
            let mut trace = trace.unwrap_or_default();
            trace.push(label);
            trace
        });
        Ok(self.status)
    }
}

pub fn trace(blackboard: &Blackboard) -> Vec<&'static str> {
    blackboard.get("trace").unwrap_or_default()
}

pub fn count(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}
