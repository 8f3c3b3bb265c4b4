//! Streaming pipeline execution.
//!
//! ```text
//!  producer ──ch0──▶ block 1 ──ch1──▶ block 2 ──ch2──▶ … ──▶ block N
//!  (input,           (stage)          (stage)                (stage, emits
//!   ItemStarted)                                               ItemEnded + progress)
//! ```
//!
//! Every block gets its own worker thread and the input gets one producer
//! thread, so N blocks use N+1 workers. Channels are FIFO, so items keep
//! input order at every stage; a bounded channel blocks its sender when full.
//!
//! Halting: a failure at item `k` (or a cancellation, treated as `k = 0`)
//! lowers the shared halt mark to `k`. Workers only admit items numbered below
//! the mark, so items before the failure drain to completion and nothing at or
//! after it starts another block. A worker that stops drops both channel ends,
//! which fails pending sends upstream and ends the receive loop downstream, so
//! teardown cannot leave any worker blocked.

use super::block::PipelineBlock;
use super::run::PipelineRun;
use super::step::PipelineTaskStep;
use crate::errors::{ConveyorError, ConveyorResult, TaskExecutionError};
use crate::executor::StepContext;
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

/// An item travelling between stages.
struct Envelope<T> {
    number: usize,
    item: T,
    started: Instant,
}

/// Shared fault/cancellation state of one streaming run.
struct Halt {
    /// Items numbered at or above this may not start another block.
    mark: AtomicUsize,
    canceled: AtomicBool,
    /// Failure with the lowest item number seen so far.
    fault: Mutex<Option<TaskExecutionError>>,
}

impl Halt {
    fn new() -> Self {
        Self {
            mark: AtomicUsize::new(usize::MAX),
            canceled: AtomicBool::new(false),
            fault: Mutex::new(None),
        }
    }

    fn admits(&self, item_number: usize) -> bool {
        item_number < self.mark.load(Ordering::SeqCst)
    }

    fn fail(&self, error: TaskExecutionError) {
        let item_number = error.item_number.unwrap_or(0);
        let mut fault = self.fault.lock();
        let earlier = fault
            .as_ref()
            .and_then(|f| f.item_number)
            .is_some_and(|existing| existing <= item_number);
        if !earlier {
            *fault = Some(error);
        }
        self.mark.fetch_min(item_number, Ordering::SeqCst);
    }

    fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
        self.mark.store(0, Ordering::SeqCst);
    }

    /// A recorded failure wins over cancellation.
    fn into_result(self) -> ConveyorResult<()> {
        if let Some(error) = self.fault.into_inner() {
            return Err(error.into());
        }
        if self.canceled.into_inner() {
            return Err(ConveyorError::Canceled);
        }
        Ok(())
    }
}

fn channel<T>(capacity: Option<usize>) -> (Sender<T>, Receiver<T>) {
    match capacity {
        Some(capacity) => crossbeam_channel::bounded(capacity),
        None => crossbeam_channel::unbounded(),
    }
}

pub(super) fn run<T: Send + 'static>(
    step: &PipelineTaskStep<T>,
    ctx: &StepContext<'_>,
    channel_capacity: Option<usize>,
) -> ConveyorResult<()> {
    let run = PipelineRun::new(ctx, step);
    let halt = Halt::new();
    let span = tracing::Span::current();

    tracing::debug!(
        step = %step.name(),
        blocks = step.blocks().len(),
        capacity = ?channel_capacity,
        "Starting streaming pipeline"
    );

    let panic = thread::scope(|scope| {
        let mut handles = Vec::with_capacity(step.blocks().len() + 1);

        // Build the chain back to front so each stage owns the sender to its
        // successor.
        let mut downstream: Option<Sender<Envelope<T>>> = None;
        for block in step.blocks().iter().rev() {
            let (tx, rx) = channel(channel_capacity);
            let next = downstream.replace(tx);
            let (run, halt, span) = (&run, &halt, span.clone());
            let handle = thread::Builder::new()
                .name(format!("conveyor-stage-{}", block.name()))
                .spawn_scoped(scope, move || {
                    let _entered = span.enter();
                    run_stage(run, halt, block, rx, next);
                })
                .map_err(|e| {
                    ConveyorError::Internal(format!(
                        "failed to spawn stage '{}': {}",
                        block.name(),
                        e
                    ))
                })?;
            handles.push(handle);
        }

        let (run_ref, halt_ref) = (&run, &halt);
        let producer_span = span.clone();
        let producer = thread::Builder::new()
            .name(format!("conveyor-input-{}", step.name()))
            .spawn_scoped(scope, move || {
                let _entered = producer_span.enter();
                produce(run_ref, halt_ref, downstream);
            })
            .map_err(|e| ConveyorError::Internal(format!("failed to spawn producer: {}", e)))?;
        handles.push(producer);

        // Join everything before surfacing a panic so no worker outlives the run.
        let mut panic = None;
        for handle in handles {
            if let Err(payload) = handle.join() {
                panic.get_or_insert(payload);
            }
        }
        Ok::<_, ConveyorError>(panic)
    })?;

    if let Some(payload) = panic {
        std::panic::resume_unwind(payload);
    }

    let result = halt.into_result();
    tracing::debug!(step = %step.name(), ok = result.is_ok(), "Streaming pipeline finished");
    result
}

/// Pull items from the input and feed the first stage.
fn produce<T: Send + 'static>(
    run: &PipelineRun<'_, T>,
    halt: &Halt,
    first_stage: Option<Sender<Envelope<T>>>,
) {
    let mut items = run.step.input().materialize();
    let mut item_number = 0;

    loop {
        if run.ctx.cancellation.is_cancelled() {
            halt.cancel();
            break;
        }
        if !halt.admits(item_number + 1) {
            break;
        }
        let Some(next) = items.next() else {
            break;
        };
        item_number += 1;

        let item = match next {
            Ok(item) => item,
            Err(e) => {
                halt.fail(run.input_failure(item_number, e));
                break;
            }
        };

        let started = Instant::now();
        run.item_started(item_number, &item);

        match &first_stage {
            Some(tx) => {
                let envelope = Envelope {
                    number: item_number,
                    item,
                    started,
                };
                if tx.send(envelope).is_err() {
                    // First stage stopped; it recorded why.
                    break;
                }
            }
            // No blocks: the item is complete as soon as it exists.
            None => run.item_completed(item_number, &item, started.elapsed()),
        }
    }

    tracing::trace!(step = %run.step.name(), items = item_number, "Producer finished");
}

/// Apply one block to every admitted item, then hand it to the next stage or
/// complete it when this is the last stage.
fn run_stage<T: Send + 'static>(
    run: &PipelineRun<'_, T>,
    halt: &Halt,
    block: &PipelineBlock<T>,
    input: Receiver<Envelope<T>>,
    output: Option<Sender<Envelope<T>>>,
) {
    for mut envelope in input.iter() {
        if run.ctx.cancellation.is_cancelled() {
            halt.cancel();
            break;
        }
        if !halt.admits(envelope.number) {
            break;
        }

        run.block_started(block, envelope.number, &envelope.item);
        let block_start = Instant::now();

        if let Err(e) = block.invoke(&mut envelope.item) {
            halt.fail(run.block_failure(block, envelope.number, &envelope.item, e));
            break;
        }

        run.block_ended(block, envelope.number, &envelope.item, block_start.elapsed());

        if run.ctx.cancellation.is_cancelled() {
            halt.cancel();
            break;
        }

        match &output {
            Some(tx) => {
                if tx.send(envelope).is_err() {
                    break;
                }
            }
            None => run.item_completed(envelope.number, &envelope.item, envelope.started.elapsed()),
        }
    }

    tracing::trace!(step = %run.step.name(), block = %block.name(), "Stage finished");
}
