#![allow(dead_code)]

use conveyor::events::{
    BlockEndedEvent, BlockStartedEvent, ItemEndedEvent, ItemStartedEvent, StepEndedEvent,
    StepStartedEvent, TaskEndedEvent, TaskStartedEvent,
};
use conveyor::{
    BlockError, EventSink, ExecutionStrategy, ExecutorOptions, TaskExecutor, TaskProgress,
    block_error,
};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

pub const STRATEGIES: [ExecutionStrategy; 2] =
    [ExecutionStrategy::Sequential, ExecutionStrategy::Streaming];

#[derive(Debug)]
pub struct TestError(pub String);

impl fmt::Display for TestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for TestError {}

pub fn fail(message: impl Into<String>) -> BlockError {
    block_error(TestError(message.into()))
}

/// Every event as a compact string, in emission order.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    /// Events whose text starts with `prefix`.
    pub fn matching(&self, prefix: &str) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.starts_with(prefix))
            .collect()
    }

    fn push(&self, event: String) {
        self.events.lock().push(event);
    }
}

impl EventSink for RecordingSink {
    fn on_task_started(&self, _event: &TaskStartedEvent<'_>) {
        self.push("TaskStarted".into());
    }

    fn on_task_ended(&self, event: &TaskEndedEvent<'_>) {
        self.push(format!("TaskEnded {:?}", event.outcome));
    }

    fn on_step_started(&self, event: &StepStartedEvent<'_>) {
        self.push(format!("StepStarted {}", event.step_name));
    }

    fn on_step_ended(&self, event: &StepEndedEvent<'_>) {
        self.push(format!("StepEnded {} {:?}", event.step_name, event.outcome));
    }

    fn on_item_started(&self, event: &ItemStartedEvent<'_>) {
        self.push(format!("ItemStarted {} {}", event.step_name, event.item_number));
    }

    fn on_item_ended(&self, event: &ItemEndedEvent<'_>) {
        self.push(format!("ItemEnded {} {}", event.step_name, event.item_number));
    }

    fn on_block_started(&self, event: &BlockStartedEvent<'_>) {
        self.push(format!(
            "BlockStarted {} {} {}",
            event.step_name, event.block_name, event.item_number
        ));
    }

    fn on_block_ended(&self, event: &BlockEndedEvent<'_>) {
        self.push(format!(
            "BlockEnded {} {} {}",
            event.step_name, event.block_name, event.item_number
        ));
    }
}

/// Progress reports collected in arrival order.
pub fn progress_log() -> (Arc<Mutex<Vec<TaskProgress>>>, impl Fn(TaskProgress) + Send + Sync) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = {
        let log = log.clone();
        move |progress: TaskProgress| log.lock().push(progress)
    };
    (log, sink)
}

pub fn options(strategy: ExecutionStrategy) -> ExecutorOptions {
    ExecutorOptions {
        strategy,
        channel_capacity: None,
    }
}

pub fn executor(strategy: ExecutionStrategy, sink: Arc<RecordingSink>) -> TaskExecutor {
    TaskExecutor::builder()
        .strategy(strategy)
        .register_events(sink)
        .build()
        .unwrap()
}
