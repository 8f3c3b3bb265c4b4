//! Sequential pipeline execution: one item at a time, block by block.

use super::run::PipelineRun;
use super::step::PipelineTaskStep;
use crate::errors::ConveyorResult;
use crate::executor::StepContext;
use std::time::Instant;

pub(super) fn run<T: Send + 'static>(
    step: &PipelineTaskStep<T>,
    ctx: &StepContext<'_>,
) -> ConveyorResult<()> {
    let run = PipelineRun::new(ctx, step);
    let mut items = step.input().materialize();
    let mut item_number = 0;

    loop {
        ctx.cancellation.check()?;
        let Some(next) = items.next() else {
            break;
        };
        item_number += 1;
        let mut item = next.map_err(|e| run.input_failure(item_number, e))?;

        run.item_started(item_number, &item);
        let item_start = Instant::now();

        for block in step.blocks() {
            run.block_started(block, item_number, &item);
            let block_start = Instant::now();

            block
                .invoke(&mut item)
                .map_err(|e| run.block_failure(block, item_number, &item, e))?;

            run.block_ended(block, item_number, &item, block_start.elapsed());
            ctx.cancellation.check()?;
        }

        run.item_completed(item_number, &item, item_start.elapsed());
    }

    tracing::debug!(step = %step.name(), items = item_number, "Sequential pipeline finished");
    Ok(())
}
