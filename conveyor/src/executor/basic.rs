use super::{StepContext, TaskStepExecutor};
use crate::errors::{ConveyorError, ConveyorResult, TaskExecutionError};
use crate::task::TaskStep;

/// Executor for [`BasicTaskStep`](crate::BasicTaskStep); shared by both strategies.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicStepExecutor;

impl TaskStepExecutor for BasicStepExecutor {
    fn execute(&self, step: &TaskStep, ctx: &StepContext<'_>) -> ConveyorResult<()> {
        let TaskStep::Basic(step) = step else {
            return Err(ConveyorError::Internal(format!(
                "basic executor cannot run {} step '{}'",
                step.kind(),
                step.name()
            )));
        };

        step.run()
            .map_err(|e| TaskExecutionError::basic(step.name(), e))?;

        ctx.report_progress(step.name(), 100);
        ctx.cancellation.check()
    }
}
