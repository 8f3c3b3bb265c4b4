//! Timing metrics collected from execution events.

use crate::events::{
    BlockEndedEvent, EventSink, ItemEndedEvent, ItemStartedEvent, StepEndedEvent,
    StepStartedEvent, TaskEndedEvent, TaskStartedEvent,
};
use crate::task::{StepKind, TaskOutcome};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct BlockMetrics {
    pub name: String,
    pub duration_ms: u128,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemMetrics {
    pub number: usize,
    pub started_at: DateTime<Utc>,
    /// `None` while the item has not passed every block.
    pub duration_ms: Option<u128>,
    pub blocks: Vec<BlockMetrics>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepMetrics {
    pub name: String,
    pub kind: StepKind,
    /// `None` while the step is running.
    pub outcome: Option<TaskOutcome>,
    pub duration_ms: Option<u128>,
    pub items: BTreeMap<usize, ItemMetrics>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskMetrics {
    pub outcome: Option<TaskOutcome>,
    pub total_duration_ms: Option<u128>,
    pub steps: Vec<StepMetrics>,
}

impl TaskMetrics {
    pub fn step(&self, name: &str) -> Option<&StepMetrics> {
        self.steps.iter().find(|step| step.name == name)
    }

    /// Total time `block` spent across all items of `step`.
    pub fn block_duration_ms(&self, step: &str, block: &str) -> Option<u128> {
        let step = self.step(step)?;
        step.items
            .values()
            .flat_map(|item| item.blocks.iter())
            .filter(|b| b.name == block)
            .map(|b| b.duration_ms)
            .reduce(|a, b| a + b)
    }
}

/// [`EventSink`] that records step, item and block timings of the most recent
/// task run.
///
/// Register one recorder per executor that runs tasks one at a time; a new
/// task start clears previously recorded metrics.
#[derive(Debug, Default)]
pub struct MetricsRecorder {
    state: Mutex<TaskMetrics>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> TaskMetrics {
        self.state.lock().clone()
    }
}

fn step_mut<'a>(metrics: &'a mut TaskMetrics, name: &str) -> Option<&'a mut StepMetrics> {
    metrics.steps.iter_mut().rev().find(|step| step.name == name)
}

impl EventSink for MetricsRecorder {
    fn on_task_started(&self, _event: &TaskStartedEvent<'_>) {
        *self.state.lock() = TaskMetrics::default();
    }

    fn on_task_ended(&self, event: &TaskEndedEvent<'_>) {
        let mut state = self.state.lock();
        state.outcome = Some(event.outcome);
        state.total_duration_ms = Some(event.duration.as_millis());
    }

    fn on_step_started(&self, event: &StepStartedEvent<'_>) {
        self.state.lock().steps.push(StepMetrics {
            name: event.step_name.to_string(),
            kind: event.step_kind,
            outcome: None,
            duration_ms: None,
            items: BTreeMap::new(),
        });
    }

    fn on_step_ended(&self, event: &StepEndedEvent<'_>) {
        let mut state = self.state.lock();
        if let Some(step) = step_mut(&mut state, event.step_name) {
            step.outcome = Some(event.outcome);
            step.duration_ms = Some(event.duration.as_millis());
        }
    }

    fn on_item_started(&self, event: &ItemStartedEvent<'_>) {
        let mut state = self.state.lock();
        if let Some(step) = step_mut(&mut state, event.step_name) {
            step.items.insert(
                event.item_number,
                ItemMetrics {
                    number: event.item_number,
                    started_at: event.timestamp,
                    duration_ms: None,
                    blocks: Vec::new(),
                },
            );
        }
    }

    fn on_item_ended(&self, event: &ItemEndedEvent<'_>) {
        let mut state = self.state.lock();
        if let Some(item) = step_mut(&mut state, event.step_name)
            .and_then(|step| step.items.get_mut(&event.item_number))
        {
            item.duration_ms = Some(event.duration.as_millis());
        }
    }

    fn on_block_ended(&self, event: &BlockEndedEvent<'_>) {
        let mut state = self.state.lock();
        if let Some(item) = step_mut(&mut state, event.step_name)
            .and_then(|step| step.items.get_mut(&event.item_number))
        {
            item.blocks.push(BlockMetrics {
                name: event.block_name.to_string(),
                duration_ms: event.duration.as_millis(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskDefinition;
    use std::time::Duration;

    #[test]
    fn test_block_duration_sums_items() {
        let task = TaskDefinition::new(Vec::new());
        let recorder = MetricsRecorder::new();
        let now = Utc::now();

        recorder.on_task_started(&TaskStartedEvent {
            task: &task,
            timestamp: now,
        });
        recorder.on_step_started(&StepStartedEvent {
            step_name: "Load",
            step_kind: StepKind::Pipeline,
            task: &task,
            timestamp: now,
        });
        for item_number in 1..=2 {
            recorder.on_item_started(&ItemStartedEvent {
                item_number,
                item: &item_number,
                step_name: "Load",
                task: &task,
                timestamp: now,
            });
            recorder.on_block_ended(&BlockEndedEvent {
                block_name: "Parse",
                item_number,
                item: &item_number,
                step_name: "Load",
                task: &task,
                duration: Duration::from_millis(5),
                timestamp: now,
            });
        }

        let metrics = recorder.snapshot();
        assert_eq!(metrics.block_duration_ms("Load", "Parse"), Some(10));
        assert_eq!(metrics.block_duration_ms("Load", "Store"), None);
        assert_eq!(metrics.step("Load").map(|s| s.items.len()), Some(2));
        assert!(metrics.step("Load").and_then(|s| s.outcome).is_none());
    }

    #[test]
    fn test_task_start_resets() {
        let task = TaskDefinition::new(Vec::new());
        let recorder = MetricsRecorder::new();
        recorder.on_step_started(&StepStartedEvent {
            step_name: "Old",
            step_kind: StepKind::Basic,
            task: &task,
            timestamp: Utc::now(),
        });

        recorder.on_task_started(&TaskStartedEvent {
            task: &task,
            timestamp: Utc::now(),
        });
        assert!(recorder.snapshot().steps.is_empty());
    }
}
