//! Task orchestration.

use super::{ExecutorResolver, StepContext, TaskStepExecutor};
use crate::cancellation::CancellationToken;
use crate::errors::{ConveyorError, ConveyorResult};
use crate::events::{
    EventSink, EventSinks, StepEndedEvent, StepStartedEvent, TaskEndedEvent, TaskStartedEvent,
};
use crate::options::{ExecutionStrategy, ExecutorOptions};
use crate::progress::ProgressSink;
use crate::task::{TaskDefinition, TaskOutcome, TaskProgress, TaskResult, TaskStep};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use ulid::Ulid;

/// Builder for [`TaskExecutor`].
///
/// Event sinks and the progress sink can only be registered here; once built,
/// the executor's observers never change.
#[derive(Default)]
pub struct TaskExecutorBuilder {
    options: ExecutorOptions,
    resolver: Option<ExecutorResolver>,
    sinks: Vec<Arc<dyn EventSink>>,
    progress: Option<Arc<dyn ProgressSink>>,
}

impl TaskExecutorBuilder {
    pub fn options(mut self, options: ExecutorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.options.strategy = strategy;
        self
    }

    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.options.channel_capacity = Some(capacity);
        self
    }

    /// Replace the standard executor table.
    pub fn resolver(mut self, resolver: ExecutorResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn register_events(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress = Some(Arc::new(sink));
        self
    }

    pub fn build(self) -> ConveyorResult<TaskExecutor> {
        self.options.validate()?;

        let resolver = self
            .resolver
            .unwrap_or_else(|| ExecutorResolver::standard(self.options.channel_capacity));

        Ok(TaskExecutor {
            strategy: self.options.strategy,
            resolver,
            events: EventSinks::new(self.sinks),
            progress: self.progress.unwrap_or_else(silent_progress),
        })
    }
}

fn silent_progress() -> Arc<dyn ProgressSink> {
    Arc::new(|_: TaskProgress| {})
}

/// Runs task definitions step by step.
///
/// One executor may run many tasks, concurrently or not; it holds no per-run
/// state.
pub struct TaskExecutor {
    strategy: ExecutionStrategy,
    resolver: ExecutorResolver,
    events: EventSinks,
    progress: Arc<dyn ProgressSink>,
}

impl TaskExecutor {
    pub fn builder() -> TaskExecutorBuilder {
        TaskExecutorBuilder::default()
    }

    /// Executor with the standard table and no observers.
    pub fn new(options: ExecutorOptions) -> ConveyorResult<Self> {
        Self::builder().options(options).build()
    }

    pub fn strategy(&self) -> ExecutionStrategy {
        self.strategy
    }

    /// Execute every step of `task` in order.
    ///
    /// Step failures and cancellation are reported through the returned
    /// [`TaskResult`]; only configuration and internal errors are returned as
    /// `Err`. Every step executor is resolved before the first step runs.
    pub fn execute(
        &self,
        task: &TaskDefinition,
        cancellation: &CancellationToken,
    ) -> ConveyorResult<TaskResult> {
        let execution_id = Ulid::new();
        let span = tracing::info_span!(
            "task",
            execution_id = %execution_id,
            task = task.name().unwrap_or("<unnamed>")
        );
        let _entered = span.enter();

        let executors = task
            .steps()
            .iter()
            .map(|step| self.resolver.resolve(step.kind(), self.strategy))
            .collect::<ConveyorResult<Vec<_>>>()?;

        tracing::info!(
            steps = executors.len(),
            strategy = %self.strategy,
            "Task started"
        );

        let start = Instant::now();
        self.events.task_started(TaskStartedEvent {
            task,
            timestamp: Utc::now(),
        });

        let ctx = StepContext {
            task,
            events: &self.events,
            progress: self.progress.as_ref(),
            cancellation,
        };

        let result = self.run_steps(task, &executors, &ctx);

        if let Ok(result) = &result {
            self.events.task_ended(TaskEndedEvent {
                task,
                outcome: result.outcome,
                duration: start.elapsed(),
                timestamp: Utc::now(),
            });
            tracing::info!(
                outcome = ?result.outcome,
                duration_ms = start.elapsed().as_millis() as u64,
                "Task finished"
            );
        }

        result
    }

    fn run_steps(
        &self,
        task: &TaskDefinition,
        executors: &[Arc<dyn TaskStepExecutor>],
        ctx: &StepContext<'_>,
    ) -> ConveyorResult<TaskResult> {
        for (step, executor) in task.steps().iter().zip(executors) {
            if ctx.cancellation.is_cancelled() {
                tracing::info!(step = %step.name(), "Canceled before step");
                return Ok(TaskResult::canceled());
            }

            match self.run_step(step, executor.as_ref(), ctx) {
                Ok(()) => {}
                Err(ConveyorError::Canceled) => return Ok(TaskResult::canceled()),
                Err(ConveyorError::StepFailed(error)) => return Ok(TaskResult::failed(*error)),
                Err(e) => return Err(e),
            }
        }

        Ok(TaskResult::successful())
    }

    fn run_step(
        &self,
        step: &TaskStep,
        executor: &dyn TaskStepExecutor,
        ctx: &StepContext<'_>,
    ) -> ConveyorResult<()> {
        let step_kind = step.kind();
        tracing::debug!(step = %step.name(), kind = %step_kind, "Step started");

        let start = Instant::now();
        self.events.step_started(StepStartedEvent {
            step_name: step.name(),
            step_kind,
            task: ctx.task,
            timestamp: Utc::now(),
        });

        let result = executor.execute(step, ctx);

        let outcome = match &result {
            Ok(()) => TaskOutcome::Successful,
            Err(ConveyorError::Canceled) => TaskOutcome::Canceled,
            Err(_) => TaskOutcome::Failed,
        };
        self.events.step_ended(StepEndedEvent {
            step_name: step.name(),
            step_kind,
            task: ctx.task,
            outcome,
            duration: start.elapsed(),
            timestamp: Utc::now(),
        });
        tracing::debug!(
            step = %step.name(),
            outcome = ?outcome,
            duration_ms = start.elapsed().as_millis() as u64,
            "Step finished"
        );

        result
    }

    /// Run [`execute`](Self::execute) on tokio's blocking pool.
    ///
    /// Block bodies are synchronous, so the execution never runs on an async
    /// worker thread.
    pub async fn execute_async(
        self: Arc<Self>,
        task: Arc<TaskDefinition>,
        cancellation: CancellationToken,
    ) -> ConveyorResult<TaskResult> {
        let span = tracing::Span::current();
        tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            self.execute(&task, &cancellation)
        })
        .await
        .map_err(|e| ConveyorError::Internal(format!("task execution join failed: {}", e)))?
    }
}

impl Default for TaskExecutor {
    fn default() -> Self {
        Self {
            strategy: ExecutionStrategy::default(),
            resolver: ExecutorResolver::default(),
            events: EventSinks::default(),
            progress: silent_progress(),
        }
    }
}
