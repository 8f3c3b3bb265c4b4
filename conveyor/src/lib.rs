//! Conveyor: sequential and streaming execution of multi-step tasks.
//!
//! A [`TaskDefinition`] is an ordered list of steps. A [`BasicTaskStep`] runs
//! one action; a [`PipelineTaskStep`] pushes every element of its input through
//! an ordered list of [`PipelineBlock`]s. A [`TaskExecutor`] runs the steps in
//! order with the configured [`ExecutionStrategy`]:
//!
//! - `Sequential`: each item passes every block before the next item starts.
//! - `Streaming`: one worker per block plus an input producer, connected by
//!   FIFO channels, so block *k* works on item *n* while block *k+1* works on
//!   item *n-1*.
//!
//! Both strategies emit the same per-item events in the same per-item order,
//! report progress per step, observe a [`CancellationToken`], and stop at the
//! first failing item.

pub mod cancellation;
pub mod errors;
pub mod events;
pub mod executor;
pub mod metrics;
pub mod options;
pub mod pipeline;
pub mod progress;
pub mod task;

pub use cancellation::CancellationToken;
pub use errors::{BlockError, ConveyorError, ConveyorResult, TaskExecutionError, block_error};
pub use events::{EventHandlers, EventSink};
pub use executor::{ExecutorResolver, TaskExecutor, TaskExecutorBuilder, TaskStepExecutor};
pub use metrics::MetricsRecorder;
pub use options::{ExecutionStrategy, ExecutorOptions};
pub use pipeline::{PipelineBlock, PipelineInput, PipelineTaskStep};
pub use progress::ProgressSink;
pub use task::{BasicTaskStep, StepKind, TaskDefinition, TaskOutcome, TaskProgress, TaskResult, TaskStep};

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install a `fmt` subscriber filtered by `RUST_LOG` (default `conveyor=info`).
///
/// Does nothing if a global subscriber is already set.
pub fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("conveyor=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
