//! Step executors and task orchestration.
//!
//! ## Architecture
//!
//! ```text
//! TaskExecutor → ExecutorResolver → TaskStepExecutor
//!
//! - TaskExecutor: runs steps in order, aggregates the TaskResult
//! - ExecutorResolver: (StepKind, ExecutionStrategy) → executor lookup table
//! - TaskStepExecutor: runs one step (basic, sequential or streaming pipeline)
//! ```

mod basic;
mod pipeline;
mod resolver;
mod task;

pub use basic::BasicStepExecutor;
pub use pipeline::{SequentialPipelineExecutor, StreamingPipelineExecutor};
pub use resolver::ExecutorResolver;
pub use task::{TaskExecutor, TaskExecutorBuilder};

use crate::cancellation::CancellationToken;
use crate::errors::ConveyorResult;
use crate::events::EventSinks;
use crate::progress::ProgressSink;
use crate::task::{TaskDefinition, TaskProgress, TaskStep};

/// Everything a step executor may touch while running one step.
pub struct StepContext<'a> {
    pub task: &'a TaskDefinition,
    pub events: &'a EventSinks,
    pub progress: &'a dyn ProgressSink,
    pub cancellation: &'a CancellationToken,
}

impl StepContext<'_> {
    pub fn report_progress(&self, step_name: &str, percentage: u8) {
        self.progress.report(TaskProgress {
            step_name: step_name.to_string(),
            percentage: percentage.min(100),
        });
    }
}

/// Runs one step.
///
/// Returns `ConveyorError::StepFailed` when caller code failed and
/// `ConveyorError::Canceled` when cancellation was observed; any other error
/// is fatal to the whole task.
pub trait TaskStepExecutor: Send + Sync {
    fn execute(&self, step: &TaskStep, ctx: &StepContext<'_>) -> ConveyorResult<()>;
}
