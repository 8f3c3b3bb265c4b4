//! Error types shared by every executor.

use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

/// Error raised by caller-supplied code (block bodies, basic actions, input
/// sequences).
///
/// Shared through `Arc` so the exact error instance the caller produced can be
/// handed back in [`TaskExecutionError::inner_error`] and compared by identity.
pub type BlockError = Arc<dyn StdError + Send + Sync + 'static>;

/// Wrap any error value into a [`BlockError`].
pub fn block_error<E>(error: E) -> BlockError
where
    E: StdError + Send + Sync + 'static,
{
    Arc::new(error)
}

/// A failure of caller-supplied code, captured together with where it happened.
#[derive(Debug, Clone, Error)]
#[error("step '{step_name}' failed: {inner_error}")]
pub struct TaskExecutionError {
    /// Name of the step whose code failed.
    pub step_name: String,
    /// Block (or pipeline input) that failed; `None` for basic steps.
    pub block_name: Option<String>,
    /// 1-based number of the item being processed; `None` for basic steps.
    pub item_number: Option<usize>,
    /// The error exactly as the caller returned it.
    #[source]
    pub inner_error: BlockError,
    /// Diagnostic payload produced by the block's exception data extractor.
    pub exception_data: Option<serde_json::Value>,
}

impl TaskExecutionError {
    pub(crate) fn basic(step_name: &str, inner_error: BlockError) -> Self {
        Self {
            step_name: step_name.to_string(),
            block_name: None,
            item_number: None,
            inner_error,
            exception_data: None,
        }
    }

    pub(crate) fn pipeline(
        step_name: &str,
        block_name: &str,
        item_number: usize,
        inner_error: BlockError,
        exception_data: Option<serde_json::Value>,
    ) -> Self {
        Self {
            step_name: step_name.to_string(),
            block_name: Some(block_name.to_string()),
            item_number: Some(item_number),
            inner_error,
            exception_data,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConveyorError {
    /// Invalid definition or executor setup, detected before any work runs.
    #[error("configuration error: {0}")]
    Config(String),

    /// Cancellation was requested and observed.
    #[error("execution canceled")]
    Canceled,

    /// Caller-supplied code failed.
    #[error(transparent)]
    StepFailed(Box<TaskExecutionError>),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<TaskExecutionError> for ConveyorError {
    fn from(error: TaskExecutionError) -> Self {
        ConveyorError::StepFailed(Box::new(error))
    }
}

pub type ConveyorResult<T> = Result<T, ConveyorError>;
