mod common;

use std::time::Duration;

use insight_engine::{animate_steps, EngineEvent, StepTiming};
use tokio_util::sync::CancellationToken;

use common::TestSink;

fn step_indices(sink: &TestSink) -> Vec<usize> {
    sink.events()
        .into_iter()
        .filter_map(|event| match event {
            EngineEvent::StepAdvanced { index, .. } => Some(index),
            _ => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn steps_advance_in_order_with_bounded_pauses() {
    let sink = TestSink::new();
    let timing = StepTiming::default();

    animate_steps(4, 9, &timing, &sink, &CancellationToken::new()).await;

    assert_eq!(step_indices(&sink), (0..9).collect::<Vec<_>>());

    let times: Vec<_> = sink.timed_events().into_iter().map(|(at, _)| at).collect();
    for pair in times.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(gap >= Duration::from_millis(500), "gap {gap:?}");
        assert!(gap <= Duration::from_millis(1500), "gap {gap:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_the_animation() {
    let sink = TestSink::new();
    let cancel = CancellationToken::new();
    let timing = StepTiming {
        min_delay: Duration::from_secs(1),
        max_delay: Duration::from_secs(1),
    };

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2500)).await;
        canceller.cancel();
    });

    animate_steps(1, 8, &timing, &sink, &cancel).await;

    // Steps at t=0s, 1s and 2s; cancelled during the third pause.
    assert_eq!(step_indices(&sink), vec![0, 1, 2]);
}

#[tokio::test(start_paused = true)]
async fn no_steps_means_no_events() {
    let sink = TestSink::new();

    animate_steps(1, 0, &StepTiming::default(), &sink, &CancellationToken::new()).await;

    assert!(sink.events().is_empty());
}

#[test]
fn delays_stay_within_bounds() {
    let timing = StepTiming::default();
    for _ in 0..500 {
        let delay = timing.next_delay();
        assert!(delay >= timing.min_delay && delay <= timing.max_delay);
    }

    let fixed = StepTiming {
        min_delay: Duration::from_millis(700),
        max_delay: Duration::from_millis(300),
    };
    assert_eq!(fixed.next_delay(), Duration::from_millis(700));
}
