//! Event and error plumbing shared by both pipeline executors.

use super::block::PipelineBlock;
use super::step::PipelineTaskStep;
use crate::errors::{BlockError, TaskExecutionError};
use crate::events::{BlockEndedEvent, BlockStartedEvent, ItemEndedEvent, ItemStartedEvent};
use crate::executor::StepContext;
use crate::progress::progress_percentage;
use chrono::Utc;
use std::time::Duration;

/// One execution of a pipeline step.
pub(super) struct PipelineRun<'a, T> {
    pub ctx: &'a StepContext<'a>,
    pub step: &'a PipelineTaskStep<T>,
}

impl<'a, T: 'static> PipelineRun<'a, T> {
    pub fn new(ctx: &'a StepContext<'a>, step: &'a PipelineTaskStep<T>) -> Self {
        Self { ctx, step }
    }

    pub fn item_started(&self, item_number: usize, item: &T) {
        self.ctx.events.item_started(ItemStartedEvent {
            item_number,
            item,
            step_name: self.step.name(),
            task: self.ctx.task,
            timestamp: Utc::now(),
        });
    }

    /// Emit ItemEnded and the progress that follows it.
    pub fn item_completed(&self, item_number: usize, item: &T, duration: Duration) {
        self.ctx.events.item_ended(ItemEndedEvent {
            item_number,
            item,
            step_name: self.step.name(),
            task: self.ctx.task,
            duration,
            timestamp: Utc::now(),
        });

        let percentage =
            progress_percentage(item_number, self.step.input().expected_item_count());
        self.ctx.report_progress(self.step.name(), percentage);
        tracing::trace!(step = %self.step.name(), item = item_number, percentage, "Item completed");
    }

    pub fn block_started(&self, block: &PipelineBlock<T>, item_number: usize, item: &T) {
        self.ctx.events.block_started(BlockStartedEvent {
            block_name: block.name(),
            item_number,
            item,
            step_name: self.step.name(),
            task: self.ctx.task,
            timestamp: Utc::now(),
        });
    }

    pub fn block_ended(
        &self,
        block: &PipelineBlock<T>,
        item_number: usize,
        item: &T,
        duration: Duration,
    ) {
        self.ctx.events.block_ended(BlockEndedEvent {
            block_name: block.name(),
            item_number,
            item,
            step_name: self.step.name(),
            task: self.ctx.task,
            duration,
            timestamp: Utc::now(),
        });
    }

    pub fn block_failure(
        &self,
        block: &PipelineBlock<T>,
        item_number: usize,
        item: &T,
        error: BlockError,
    ) -> TaskExecutionError {
        tracing::warn!(
            step = %self.step.name(),
            block = %block.name(),
            item = item_number,
            error = %error,
            "Block failed"
        );
        TaskExecutionError::pipeline(
            self.step.name(),
            block.name(),
            item_number,
            error,
            block.exception_data(item),
        )
    }

    pub fn input_failure(&self, item_number: usize, error: BlockError) -> TaskExecutionError {
        tracing::warn!(
            step = %self.step.name(),
            input = %self.step.input().name(),
            item = item_number,
            error = %error,
            "Input materialization failed"
        );
        TaskExecutionError::pipeline(
            self.step.name(),
            self.step.input().name(),
            item_number,
            error,
            None,
        )
    }
}
