//! Static (step kind, strategy) → executor table.

use super::{BasicStepExecutor, SequentialPipelineExecutor, StreamingPipelineExecutor, TaskStepExecutor};
use crate::errors::{ConveyorError, ConveyorResult};
use crate::options::ExecutionStrategy;
use crate::task::StepKind;
use std::collections::HashMap;
use std::sync::Arc;

/// Lookup table from step kind and strategy to the executor that runs it.
///
/// Lookups never inspect the step itself; a missing entry is a configuration
/// error reported at resolve time.
#[derive(Clone)]
pub struct ExecutorResolver {
    table: HashMap<(StepKind, ExecutionStrategy), Arc<dyn TaskStepExecutor>>,
}

impl ExecutorResolver {
    /// A table with no entries.
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// The standard table: basic steps under either strategy, and both
    /// pipeline executors.
    pub fn standard(channel_capacity: Option<usize>) -> Self {
        let basic: Arc<dyn TaskStepExecutor> = Arc::new(BasicStepExecutor);

        Self::empty()
            .register(StepKind::Basic, ExecutionStrategy::Sequential, basic.clone())
            .register(StepKind::Basic, ExecutionStrategy::Streaming, basic)
            .register(
                StepKind::Pipeline,
                ExecutionStrategy::Sequential,
                Arc::new(SequentialPipelineExecutor),
            )
            .register(
                StepKind::Pipeline,
                ExecutionStrategy::Streaming,
                Arc::new(StreamingPipelineExecutor::new(channel_capacity)),
            )
    }

    /// Add or replace an entry.
    pub fn register(
        mut self,
        kind: StepKind,
        strategy: ExecutionStrategy,
        executor: Arc<dyn TaskStepExecutor>,
    ) -> Self {
        self.table.insert((kind, strategy), executor);
        self
    }

    pub fn resolve(
        &self,
        kind: StepKind,
        strategy: ExecutionStrategy,
    ) -> ConveyorResult<Arc<dyn TaskStepExecutor>> {
        self.table.get(&(kind, strategy)).cloned().ok_or_else(|| {
            ConveyorError::Config(format!(
                "no executor registered for {} steps with {} strategy",
                kind, strategy
            ))
        })
    }
}

impl Default for ExecutorResolver {
    fn default() -> Self {
        Self::standard(None)
    }
}
