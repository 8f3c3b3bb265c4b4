//! Execution events and their observers.
//!
//! Sinks are registered on the [`TaskExecutorBuilder`](crate::TaskExecutorBuilder)
//! and frozen into an [`EventSinks`] collection before any execution starts.
//! The streaming executor invokes sinks from several worker threads at once,
//! which is why [`EventSink`] requires `Send + Sync`; the collection itself is
//! never mutated after construction.

mod handlers;

pub use handlers::EventHandlers;

use crate::task::{StepKind, TaskDefinition, TaskOutcome};
use chrono::{DateTime, Utc};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct TaskStartedEvent<'a> {
    pub task: &'a TaskDefinition,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct TaskEndedEvent<'a> {
    pub task: &'a TaskDefinition,
    pub outcome: TaskOutcome,
    pub duration: Duration,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct StepStartedEvent<'a> {
    pub step_name: &'a str,
    pub step_kind: StepKind,
    pub task: &'a TaskDefinition,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct StepEndedEvent<'a> {
    pub step_name: &'a str,
    pub step_kind: StepKind,
    pub task: &'a TaskDefinition,
    /// Outcome of this step alone.
    pub outcome: TaskOutcome,
    pub duration: Duration,
    pub timestamp: DateTime<Utc>,
}

/// An item entered the pipeline (emitted in input order).
#[derive(Clone, Copy)]
pub struct ItemStartedEvent<'a> {
    /// 1-based position in the input sequence.
    pub item_number: usize,
    /// The item itself; downcast to the step's item type.
    pub item: &'a dyn Any,
    pub step_name: &'a str,
    pub task: &'a TaskDefinition,
    pub timestamp: DateTime<Utc>,
}

/// An item passed through every block.
#[derive(Clone, Copy)]
pub struct ItemEndedEvent<'a> {
    pub item_number: usize,
    pub item: &'a dyn Any,
    pub step_name: &'a str,
    pub task: &'a TaskDefinition,
    /// Time from ItemStarted to the end of the last block.
    pub duration: Duration,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Copy)]
pub struct BlockStartedEvent<'a> {
    pub block_name: &'a str,
    pub item_number: usize,
    pub item: &'a dyn Any,
    pub step_name: &'a str,
    pub task: &'a TaskDefinition,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Copy)]
pub struct BlockEndedEvent<'a> {
    pub block_name: &'a str,
    pub item_number: usize,
    pub item: &'a dyn Any,
    pub step_name: &'a str,
    pub task: &'a TaskDefinition,
    /// Time spent in the block body.
    pub duration: Duration,
    pub timestamp: DateTime<Utc>,
}

/// Observer of execution events. Every handler defaults to a no-op.
pub trait EventSink: Send + Sync {
    fn on_task_started(&self, _event: &TaskStartedEvent<'_>) {}
    fn on_task_ended(&self, _event: &TaskEndedEvent<'_>) {}
    fn on_step_started(&self, _event: &StepStartedEvent<'_>) {}
    fn on_step_ended(&self, _event: &StepEndedEvent<'_>) {}
    fn on_item_started(&self, _event: &ItemStartedEvent<'_>) {}
    fn on_item_ended(&self, _event: &ItemEndedEvent<'_>) {}
    fn on_block_started(&self, _event: &BlockStartedEvent<'_>) {}
    fn on_block_ended(&self, _event: &BlockEndedEvent<'_>) {}
}

/// Immutable set of registered sinks, cheap to clone.
#[derive(Clone, Default)]
pub struct EventSinks {
    sinks: Arc<[Arc<dyn EventSink>]>,
}

impl EventSinks {
    pub fn new(sinks: Vec<Arc<dyn EventSink>>) -> Self {
        Self {
            sinks: sinks.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub(crate) fn task_started(&self, event: TaskStartedEvent<'_>) {
        self.sinks.iter().for_each(|s| s.on_task_started(&event));
    }

    pub(crate) fn task_ended(&self, event: TaskEndedEvent<'_>) {
        self.sinks.iter().for_each(|s| s.on_task_ended(&event));
    }

    pub(crate) fn step_started(&self, event: StepStartedEvent<'_>) {
        self.sinks.iter().for_each(|s| s.on_step_started(&event));
    }

    pub(crate) fn step_ended(&self, event: StepEndedEvent<'_>) {
        self.sinks.iter().for_each(|s| s.on_step_ended(&event));
    }

    pub(crate) fn item_started(&self, event: ItemStartedEvent<'_>) {
        self.sinks.iter().for_each(|s| s.on_item_started(&event));
    }

    pub(crate) fn item_ended(&self, event: ItemEndedEvent<'_>) {
        self.sinks.iter().for_each(|s| s.on_item_ended(&event));
    }

    pub(crate) fn block_started(&self, event: BlockStartedEvent<'_>) {
        self.sinks.iter().for_each(|s| s.on_block_started(&event));
    }

    pub(crate) fn block_ended(&self, event: BlockEndedEvent<'_>) {
        self.sinks.iter().for_each(|s| s.on_block_ended(&event));
    }
}
