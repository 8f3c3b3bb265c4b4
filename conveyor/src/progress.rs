//! Progress reporting.

use crate::task::TaskProgress;

/// Receiver of per-step progress updates.
///
/// May be invoked from several threads by the streaming executor. Reports for
/// one step never decrease.
pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: TaskProgress);
}

impl<F> ProgressSink for F
where
    F: Fn(TaskProgress) + Send + Sync,
{
    fn report(&self, progress: TaskProgress) {
        self(progress)
    }
}

/// Percentage of a step completed after `item_number` items.
///
/// `min(100, round(item_number / expected_item_count * 100))`. The expected
/// count is only a hint: more items than expected clamp at 100 early, fewer
/// items never reach 100. An expected count of zero reports 100.
pub fn progress_percentage(item_number: usize, expected_item_count: usize) -> u8 {
    if expected_item_count == 0 {
        return 100;
    }

    let ratio = item_number as f64 / expected_item_count as f64;
    (ratio * 100.0).round().min(100.0) as u8
}
