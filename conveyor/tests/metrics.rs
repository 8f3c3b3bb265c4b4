mod common;

use common::STRATEGIES;
use conveyor::{
    BasicTaskStep, CancellationToken, MetricsRecorder, PipelineBlock, PipelineInput,
    PipelineTaskStep, StepKind, TaskDefinition, TaskExecutor, TaskOutcome,
};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_recorder_collects_block_timings() {
    for strategy in STRATEGIES {
        let recorder = Arc::new(MetricsRecorder::new());
        let executor = TaskExecutor::builder()
            .strategy(strategy)
            .register_events(recorder.clone())
            .build()
            .unwrap();

        let step = PipelineTaskStep::new(
            "Load",
            PipelineInput::from_vec(vec![1u8, 2, 3]),
            vec![
                PipelineBlock::new("Wait", |_: &mut u8| {
                    std::thread::sleep(Duration::from_millis(5));
                    Ok(())
                }),
                PipelineBlock::new("Noop", |_: &mut u8| Ok(())),
            ],
        )
        .unwrap();
        let task = TaskDefinition::named(
            "Metrics",
            vec![BasicTaskStep::empty("Setup").into(), step.into()],
        );

        executor.execute(&task, &CancellationToken::new()).unwrap();
        let metrics = recorder.snapshot();

        assert_eq!(metrics.outcome, Some(TaskOutcome::Successful));
        assert_eq!(metrics.steps.len(), 2);
        assert_eq!(metrics.steps[0].kind, StepKind::Basic);
        assert!(metrics.steps[0].items.is_empty());

        let load = metrics.step("Load").unwrap();
        assert_eq!(load.outcome, Some(TaskOutcome::Successful));
        assert_eq!(load.items.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(load.items.values().all(|item| {
            item.duration_ms.is_some()
                && item.blocks.iter().map(|b| b.name.as_str()).collect::<Vec<_>>() == ["Wait", "Noop"]
        }));
        assert!(metrics.block_duration_ms("Load", "Wait").unwrap() >= 15);
    }
}
