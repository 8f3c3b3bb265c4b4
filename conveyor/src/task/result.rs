//! Execution results and progress reports.

use crate::errors::TaskExecutionError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskOutcome {
    Successful,
    Canceled,
    Failed,
}

/// Final state of one task execution.
#[derive(Debug, Clone)]
pub struct TaskResult {
    pub outcome: TaskOutcome,
    /// Empty unless `outcome` is `Failed`, in which case it holds exactly one error.
    pub errors: Vec<TaskExecutionError>,
}

impl TaskResult {
    pub fn successful() -> Self {
        Self {
            outcome: TaskOutcome::Successful,
            errors: Vec::new(),
        }
    }

    pub fn canceled() -> Self {
        Self {
            outcome: TaskOutcome::Canceled,
            errors: Vec::new(),
        }
    }

    pub fn failed(error: TaskExecutionError) -> Self {
        Self {
            outcome: TaskOutcome::Failed,
            errors: vec![error],
        }
    }

    pub fn is_successful(&self) -> bool {
        self.outcome == TaskOutcome::Successful
    }
}

/// Percentage-complete update for one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskProgress {
    pub step_name: String,
    /// Always within `0..=100`.
    pub percentage: u8,
}
