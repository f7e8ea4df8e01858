use insight_app::effects::engine_event_to_msg;
use insight_core::{JobOutcome, Msg};
use insight_engine::{ClientError, EngineEvent, FailureKind, TaskId};
use serde_json::json;

#[test]
fn completion_maps_to_tagged_outcomes() {
    let completed = engine_event_to_msg(EngineEvent::JobCompleted {
        job_id: 4,
        result: Ok(insight_engine::JobOutcome::Completed(json!({"result": "text"}))),
    });
    assert_eq!(
        completed,
        Some(Msg::JobFinished {
            job_id: 4,
            outcome: JobOutcome::Completed(json!({"result": "text"})),
        })
    );

    let timed_out = engine_event_to_msg(EngineEvent::JobCompleted {
        job_id: 4,
        result: Ok(insight_engine::JobOutcome::TimedOut { attempts: 60 }),
    });
    assert_eq!(
        timed_out,
        Some(Msg::JobFinished {
            job_id: 4,
            outcome: JobOutcome::TimedOut { attempts: 60 },
        })
    );

    let odd = engine_event_to_msg(EngineEvent::JobCompleted {
        job_id: 4,
        result: Ok(insight_engine::JobOutcome::UnexpectedStatus("error".into())),
    });
    assert_eq!(
        odd,
        Some(Msg::JobFinished {
            job_id: 4,
            outcome: JobOutcome::Failed {
                reason: "unexpected status `error`".into(),
            },
        })
    );

    let failed = engine_event_to_msg(EngineEvent::JobCompleted {
        job_id: 4,
        result: Err(ClientError::new(FailureKind::HttpStatus(503), "503 Service Unavailable")),
    });
    assert_eq!(
        failed,
        Some(Msg::JobFinished {
            job_id: 4,
            outcome: JobOutcome::Failed {
                reason: "http status 503: 503 Service Unavailable".into(),
            },
        })
    );
}

#[test]
fn progress_events_keep_their_job_id() {
    assert_eq!(
        engine_event_to_msg(EngineEvent::Submitted {
            job_id: 2,
            task_id: TaskId::new("abc123"),
        }),
        Some(Msg::JobSubmitted {
            job_id: 2,
            task_id: "abc123".into(),
        })
    );
    assert_eq!(
        engine_event_to_msg(EngineEvent::StepAdvanced { job_id: 2, index: 5 }),
        Some(Msg::StepAdvanced { job_id: 2, index: 5 })
    );
}

#[test]
fn latest_result_for_unknown_category_is_dropped() {
    assert_eq!(
        engine_event_to_msg(EngineEvent::LatestResult {
            category: "weather".into(),
            result: Ok(None),
        }),
        None
    );
}
