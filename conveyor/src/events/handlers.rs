//! Closure-based event sink.

use super::{
    BlockEndedEvent, BlockStartedEvent, EventSink, ItemEndedEvent, ItemStartedEvent,
    StepEndedEvent, StepStartedEvent, TaskEndedEvent, TaskStartedEvent,
};

/// An [`EventSink`] assembled from optional closures.
///
/// Handlers that are not set are simply never invoked.
///
/// ```ignore
/// let sink = EventHandlers::new()
///     .on_item_ended(|e| println!("item {} took {:?}", e.item_number, e.duration));
/// ```
#[derive(Default)]
pub struct EventHandlers {
    task_started: Option<Box<dyn for<'a> Fn(&TaskStartedEvent<'a>) + Send + Sync>>,
    task_ended: Option<Box<dyn for<'a> Fn(&TaskEndedEvent<'a>) + Send + Sync>>,
    step_started: Option<Box<dyn for<'a> Fn(&StepStartedEvent<'a>) + Send + Sync>>,
    step_ended: Option<Box<dyn for<'a> Fn(&StepEndedEvent<'a>) + Send + Sync>>,
    item_started: Option<Box<dyn for<'a> Fn(&ItemStartedEvent<'a>) + Send + Sync>>,
    item_ended: Option<Box<dyn for<'a> Fn(&ItemEndedEvent<'a>) + Send + Sync>>,
    block_started: Option<Box<dyn for<'a> Fn(&BlockStartedEvent<'a>) + Send + Sync>>,
    block_ended: Option<Box<dyn for<'a> Fn(&BlockEndedEvent<'a>) + Send + Sync>>,
}

impl EventHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_task_started<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&TaskStartedEvent<'a>) + Send + Sync + 'static,
    {
        self.task_started = Some(Box::new(f));
        self
    }

    pub fn on_task_ended<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&TaskEndedEvent<'a>) + Send + Sync + 'static,
    {
        self.task_ended = Some(Box::new(f));
        self
    }

    pub fn on_step_started<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&StepStartedEvent<'a>) + Send + Sync + 'static,
    {
        self.step_started = Some(Box::new(f));
        self
    }

    pub fn on_step_ended<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&StepEndedEvent<'a>) + Send + Sync + 'static,
    {
        self.step_ended = Some(Box::new(f));
        self
    }

    pub fn on_item_started<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&ItemStartedEvent<'a>) + Send + Sync + 'static,
    {
        self.item_started = Some(Box::new(f));
        self
    }

    pub fn on_item_ended<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&ItemEndedEvent<'a>) + Send + Sync + 'static,
    {
        self.item_ended = Some(Box::new(f));
        self
    }

    pub fn on_block_started<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&BlockStartedEvent<'a>) + Send + Sync + 'static,
    {
        self.block_started = Some(Box::new(f));
        self
    }

    pub fn on_block_ended<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&BlockEndedEvent<'a>) + Send + Sync + 'static,
    {
        self.block_ended = Some(Box::new(f));
        self
    }
}

impl EventSink for EventHandlers {
    fn on_task_started(&self, event: &TaskStartedEvent<'_>) {
        if let Some(handler) = &self.task_started {
            handler(event);
        }
    }

    fn on_task_ended(&self, event: &TaskEndedEvent<'_>) {
        if let Some(handler) = &self.task_ended {
            handler(event);
        }
    }

    fn on_step_started(&self, event: &StepStartedEvent<'_>) {
        if let Some(handler) = &self.step_started {
            handler(event);
        }
    }

    fn on_step_ended(&self, event: &StepEndedEvent<'_>) {
        if let Some(handler) = &self.step_ended {
            handler(event);
        }
    }

    fn on_item_started(&self, event: &ItemStartedEvent<'_>) {
        if let Some(handler) = &self.item_started {
            handler(event);
        }
    }

    fn on_item_ended(&self, event: &ItemEndedEvent<'_>) {
        if let Some(handler) = &self.item_ended {
            handler(event);
        }
    }

    fn on_block_started(&self, event: &BlockStartedEvent<'_>) {
        if let Some(handler) = &self.block_started {
            handler(event);
        }
    }

    fn on_block_ended(&self, event: &BlockEndedEvent<'_>) {
        if let Some(handler) = &self.block_ended {
            handler(event);
        }
    }
}
