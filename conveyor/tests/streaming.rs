mod common;

use common::{RecordingSink, fail};
use conveyor::{
    CancellationToken, EventHandlers, ExecutionStrategy, ExecutorOptions, PipelineBlock,
    PipelineInput, PipelineTaskStep, TaskDefinition, TaskExecutor, TaskOutcome,
};
use rand::Rng;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const ITEMS: usize = 12;

fn jitter() {
    let micros = rand::rng().random_range(0..60);
    if micros > 0 {
        std::thread::sleep(Duration::from_micros(micros));
    }
}

fn faulty_step(blocks: usize, fail_block: usize, fail_item: usize) -> PipelineTaskStep<usize> {
    let blocks = (0..blocks)
        .map(|index| {
            PipelineBlock::new(format!("B{index}"), move |item: &mut usize| {
                jitter();
                if index == fail_block && *item == fail_item {
                    return Err(fail(format!("B{index} failed on {item}")));
                }
                Ok(())
            })
        })
        .collect();
    PipelineTaskStep::new("Stress", PipelineInput::from_vec((1..=ITEMS).collect()), blocks)
        .unwrap()
}

#[test]
fn test_fault_at_every_stage_position() {
    let capacities = [None, Some(1), Some(3)];

    for capacity in capacities {
        let options = ExecutorOptions {
            strategy: ExecutionStrategy::Streaming,
            channel_capacity: capacity,
        };

        for blocks in 1..=4 {
            for fail_block in 0..blocks {
                for fail_item in [1, 2, ITEMS / 2, ITEMS] {
                    let sink = RecordingSink::new();
                    let executor = TaskExecutor::builder()
                        .options(options.clone())
                        .register_events(sink.clone())
                        .build()
                        .unwrap();
                    let task = TaskDefinition::new(vec![
                        faulty_step(blocks, fail_block, fail_item).into(),
                    ]);

                    let result = executor.execute(&task, &CancellationToken::new()).unwrap();

                    let context = format!(
                        "capacity={capacity:?} blocks={blocks} fail_block={fail_block} fail_item={fail_item}"
                    );
                    assert_eq!(result.outcome, TaskOutcome::Failed, "{context}");
                    assert_eq!(result.errors.len(), 1, "{context}");
                    let error = &result.errors[0];
                    assert_eq!(error.item_number, Some(fail_item), "{context}");
                    assert_eq!(
                        error.block_name.as_deref(),
                        Some(format!("B{fail_block}").as_str()),
                        "{context}"
                    );

                    let ended: Vec<String> = (1..fail_item)
                        .map(|n| format!("ItemEnded Stress {n}"))
                        .collect();
                    assert_eq!(sink.matching("ItemEnded"), ended, "{context}");

                    // Nothing after the failing item reaches the failing block
                    // or any block behind it.
                    for later in fail_item + 1..=ITEMS {
                        for block in fail_block..blocks {
                            assert!(
                                sink.matching(&format!("BlockStarted Stress B{block} {later}"))
                                    .is_empty(),
                                "{context}"
                            );
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn test_stages_overlap() {
    // "Second" waits for "First" to reach item 2 while it still holds item 1,
    // which only happens when the stages run concurrently.
    let (tx, rx) = crossbeam_channel::unbounded::<usize>();
    let step = PipelineTaskStep::new(
        "Overlap",
        PipelineInput::from_vec(vec![1usize, 2, 3]),
        vec![
            PipelineBlock::new("First", move |item: &mut usize| {
                let _ = tx.send(*item);
                Ok(())
            }),
            PipelineBlock::new("Second", move |item: &mut usize| {
                if *item == 1 {
                    loop {
                        match rx.recv_timeout(Duration::from_secs(5)) {
                            Ok(2) => break,
                            Ok(_) => continue,
                            Err(_) => return Err(fail("stages did not overlap")),
                        }
                    }
                }
                Ok(())
            }),
        ],
    )
    .unwrap();

    let executor = TaskExecutor::new(ExecutorOptions::streaming()).unwrap();
    let result = executor
        .execute(&TaskDefinition::new(vec![step.into()]), &CancellationToken::new())
        .unwrap();
    assert!(result.is_successful(), "{:?}", result.errors);
}

#[test]
fn test_bounded_channels_apply_backpressure() {
    let started = Arc::new(AtomicUsize::new(0));
    let max_ahead = Arc::new(AtomicUsize::new(0));

    let sink = {
        let started = started.clone();
        EventHandlers::new().on_item_started(move |_| {
            started.fetch_add(1, Ordering::SeqCst);
        })
    };

    let step = {
        let started = started.clone();
        let max_ahead = max_ahead.clone();
        PipelineTaskStep::new(
            "Backpressure",
            PipelineInput::from_vec((1..=40usize).collect()),
            vec![
                PipelineBlock::new("Fast", |_: &mut usize| Ok(())),
                PipelineBlock::new("Slow", move |item: &mut usize| {
                    std::thread::sleep(Duration::from_millis(2));
                    let ahead = started.load(Ordering::SeqCst).saturating_sub(*item);
                    max_ahead.fetch_max(ahead, Ordering::SeqCst);
                    Ok(())
                }),
            ],
        )
        .unwrap()
    };

    let executor = TaskExecutor::builder()
        .options(ExecutorOptions::streaming().with_channel_capacity(1))
        .register_events(Arc::new(sink))
        .build()
        .unwrap();
    let result = executor
        .execute(&TaskDefinition::new(vec![step.into()]), &CancellationToken::new())
        .unwrap();

    assert!(result.is_successful());
    // Two channels, one item in "Fast" and one held by the blocked producer.
    assert!(max_ahead.load(Ordering::SeqCst) <= 4);
}

#[test]
#[should_panic(expected = "stage exploded")]
fn test_worker_panic_propagates() {
    let step = PipelineTaskStep::new(
        "Panics",
        PipelineInput::from_vec(vec![1, 2, 3]),
        vec![
            PipelineBlock::new("Ok", |_: &mut i32| Ok(())),
            PipelineBlock::new("Explode", |item: &mut i32| {
                if *item == 2 {
                    panic!("stage exploded");
                }
                Ok(())
            }),
        ],
    )
    .unwrap();

    let executor = TaskExecutor::new(ExecutorOptions::streaming().with_channel_capacity(1)).unwrap();
    let _ = executor.execute(&TaskDefinition::new(vec![step.into()]), &CancellationToken::new());
}
