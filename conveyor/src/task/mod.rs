//! Task definition model.
//!
//! A task is an immutable, ordered list of steps. Each step is either a
//! [`BasicTaskStep`] (one action) or a pipeline step (items pushed through
//! blocks, see [`crate::pipeline`]).

mod basic;
mod result;

pub use basic::BasicTaskStep;
pub use result::{TaskOutcome, TaskProgress, TaskResult};

use crate::pipeline::{PipelineStepRun, PipelineTaskStep};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminant of [`TaskStep`], used as the resolver key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepKind {
    Basic,
    Pipeline,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::Basic => f.write_str("basic"),
            StepKind::Pipeline => f.write_str("pipeline"),
        }
    }
}

/// One unit of a task.
pub enum TaskStep {
    Basic(BasicTaskStep),
    /// Type-erased pipeline step; the item type lives behind the trait object.
    Pipeline(Box<dyn PipelineStepRun>),
}

impl TaskStep {
    pub fn name(&self) -> &str {
        match self {
            TaskStep::Basic(step) => step.name(),
            TaskStep::Pipeline(step) => step.name(),
        }
    }

    pub fn kind(&self) -> StepKind {
        match self {
            TaskStep::Basic(_) => StepKind::Basic,
            TaskStep::Pipeline(_) => StepKind::Pipeline,
        }
    }
}

impl fmt::Debug for TaskStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskStep")
            .field("kind", &self.kind())
            .field("name", &self.name())
            .finish()
    }
}

impl From<BasicTaskStep> for TaskStep {
    fn from(step: BasicTaskStep) -> Self {
        TaskStep::Basic(step)
    }
}

impl<T: Send + 'static> From<PipelineTaskStep<T>> for TaskStep {
    fn from(step: PipelineTaskStep<T>) -> Self {
        TaskStep::Pipeline(Box::new(step))
    }
}

/// An optionally named, ordered list of steps.
///
/// Built once by the caller and only read during execution.
#[derive(Debug)]
pub struct TaskDefinition {
    name: Option<String>,
    steps: Vec<TaskStep>,
}

impl TaskDefinition {
    pub fn new(steps: Vec<TaskStep>) -> Self {
        Self { name: None, steps }
    }

    pub fn named(name: impl Into<String>, steps: Vec<TaskStep>) -> Self {
        Self {
            name: Some(name.into()),
            steps,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn steps(&self) -> &[TaskStep] {
        &self.steps
    }
}
