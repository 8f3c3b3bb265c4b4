use super::{StepContext, TaskStepExecutor};
use crate::errors::{ConveyorError, ConveyorResult};
use crate::pipeline::PipelineStepRun;
use crate::task::TaskStep;

fn pipeline_step<'a>(step: &'a TaskStep, executor: &str) -> ConveyorResult<&'a dyn PipelineStepRun> {
    match step {
        TaskStep::Pipeline(step) => Ok(step.as_ref()),
        other => Err(ConveyorError::Internal(format!(
            "{} executor cannot run {} step '{}'",
            executor,
            other.kind(),
            other.name()
        ))),
    }
}

/// Runs each item through every block before the next item starts.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialPipelineExecutor;

impl TaskStepExecutor for SequentialPipelineExecutor {
    fn execute(&self, step: &TaskStep, ctx: &StepContext<'_>) -> ConveyorResult<()> {
        pipeline_step(step, "sequential pipeline")?.run_sequential(ctx)
    }
}

/// Runs blocks as concurrent stages connected by FIFO channels.
#[derive(Debug, Default, Clone, Copy)]
pub struct StreamingPipelineExecutor {
    channel_capacity: Option<usize>,
}

impl StreamingPipelineExecutor {
    /// `None` connects stages with unbounded channels.
    pub fn new(channel_capacity: Option<usize>) -> Self {
        Self { channel_capacity }
    }

    pub fn channel_capacity(&self) -> Option<usize> {
        self.channel_capacity
    }
}

impl TaskStepExecutor for StreamingPipelineExecutor {
    fn execute(&self, step: &TaskStep, ctx: &StepContext<'_>) -> ConveyorResult<()> {
        pipeline_step(step, "streaming pipeline")?.run_streaming(ctx, self.channel_capacity)
    }
}
