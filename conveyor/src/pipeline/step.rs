//! Pipeline step definition and its type-erased runner.

use super::block::PipelineBlock;
use super::input::PipelineInput;
use super::{sequential, streaming};
use crate::errors::{ConveyorError, ConveyorResult};
use crate::executor::StepContext;
use std::collections::HashSet;
use std::fmt;

/// Object-safe view of a [`PipelineTaskStep`] with its item type erased.
///
/// Executors only ever see this trait; the generic item type is recovered
/// inside the step's own implementation.
pub trait PipelineStepRun: Send + Sync {
    fn name(&self) -> &str;

    fn input_name(&self) -> &str;

    fn expected_item_count(&self) -> usize;

    /// Block names in declaration order.
    fn block_names(&self) -> Vec<&str>;

    /// Run every item through all blocks before starting the next item.
    fn run_sequential(&self, ctx: &StepContext<'_>) -> ConveyorResult<()>;

    /// Run one worker per block, connected by channels of `channel_capacity`
    /// (`None` = unbounded).
    fn run_streaming(
        &self,
        ctx: &StepContext<'_>,
        channel_capacity: Option<usize>,
    ) -> ConveyorResult<()>;
}

/// Ordered blocks applied to every element of an input sequence.
pub struct PipelineTaskStep<T> {
    name: String,
    input: PipelineInput<T>,
    blocks: Vec<PipelineBlock<T>>,
}

impl<T> PipelineTaskStep<T> {
    /// Build a step. Block names must be unique within the step.
    pub fn new(
        name: impl Into<String>,
        input: PipelineInput<T>,
        blocks: Vec<PipelineBlock<T>>,
    ) -> ConveyorResult<Self> {
        let name = name.into();

        let duplicate = {
            let mut seen = HashSet::new();
            blocks
                .iter()
                .find(|b| !seen.insert(b.name()))
                .map(|b| b.name().to_string())
        };
        if let Some(duplicate) = duplicate {
            return Err(ConveyorError::Config(format!(
                "duplicate block name '{}' in step '{}'",
                duplicate, name
            )));
        }

        Ok(Self {
            name,
            input,
            blocks,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input(&self) -> &PipelineInput<T> {
        &self.input
    }

    pub fn blocks(&self) -> &[PipelineBlock<T>] {
        &self.blocks
    }
}

impl<T: Send + 'static> PipelineStepRun for PipelineTaskStep<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_name(&self) -> &str {
        self.input.name()
    }

    fn expected_item_count(&self) -> usize {
        self.input.expected_item_count()
    }

    fn block_names(&self) -> Vec<&str> {
        self.blocks.iter().map(|b| b.name()).collect()
    }

    fn run_sequential(&self, ctx: &StepContext<'_>) -> ConveyorResult<()> {
        sequential::run(self, ctx)
    }

    fn run_streaming(
        &self,
        ctx: &StepContext<'_>,
        channel_capacity: Option<usize>,
    ) -> ConveyorResult<()> {
        streaming::run(self, ctx, channel_capacity)
    }
}

impl<T> fmt::Debug for PipelineTaskStep<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineTaskStep")
            .field("name", &self.name)
            .field("input", &self.input)
            .field("blocks", &self.blocks)
            .finish()
    }
}
