//! Pipeline steps and their two execution strategies.
//!
//! A pipeline step pushes every element of a lazily produced input through an
//! ordered chain of blocks.
//!
//! ## Architecture
//!
//! ```text
//! PipelineTaskStep<T> → PipelineInput<T> + [PipelineBlock<T>]
//!
//! - PipelineInput: lazy, fallible item source plus an expected-count hint
//! - PipelineBlock: named body applied to each item (or batch)
//! - PipelineStepRun: item type erased, so steps of any T share one task
//! ```
//!
//! Both strategies emit the same events in the same per-item order, report
//! the same progress values and halt on the first failure with the same error
//! shape; they differ only in how much work overlaps.
//!
//! ## Example
//!
//! ```ignore
//! let step = PipelineTaskStep::new(
//!     "Import",
//!     PipelineInput::from_vec(vec![vec![1, 2, 3], vec![4, 5, 6]]),
//!     vec![
//!         PipelineBlock::item_body("Validate", |x: &mut i32| Ok(())),
//!         PipelineBlock::batch_body("Store", |batch: &mut Vec<i32>| Ok(())),
//!     ],
//! )?;
//! ```

mod block;
mod input;
mod run;
mod sequential;
mod step;
mod streaming;

pub use block::PipelineBlock;
pub use input::{DEFAULT_INPUT_NAME, PipelineInput};
pub use step::{PipelineStepRun, PipelineTaskStep};
