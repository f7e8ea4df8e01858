use std::sync::Once;

use insight_core::{
    update, AppState, BackendStatus, Category, Effect, JobOutcome, JobPhase, Msg,
};
use serde_json::json;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(insight_logging::initialize_for_tests);
}

#[test]
fn resubmission_cancels_previous_job_and_ignores_its_events() {
    init_logging();
    let (state, first) = update(AppState::new(), Msg::AnalyzeRequested(Category::Lowes));
    assert_eq!(
        first,
        vec![Effect::SubmitJob {
            job_id: 1,
            category: Category::Lowes
        }]
    );

    let (state, second) = update(state, Msg::AnalyzeRequested(Category::Lowes));
    assert_eq!(
        second,
        vec![
            Effect::CancelJob { job_id: 1 },
            Effect::SubmitJob {
                job_id: 2,
                category: Category::Lowes
            },
        ]
    );

    // The superseded job finishing late must not touch the slot.
    let (mut state, _) = update(
        state,
        Msg::JobFinished {
            job_id: 1,
            outcome: JobOutcome::Completed(json!({"result": "stale"})),
        },
    );
    assert!(state.consume_dirty());
    let (mut state, _) = update(
        state,
        Msg::JobFinished {
            job_id: 1,
            outcome: JobOutcome::Completed(json!({"result": "stale"})),
        },
    );
    assert!(!state.consume_dirty());
    assert_eq!(state.result(Category::Lowes), None);
    assert!(state.is_loading(Category::Lowes));

    let (state, _) = update(
        state,
        Msg::JobFinished {
            job_id: 2,
            outcome: JobOutcome::Completed(json!({"result": "fresh"})),
        },
    );
    assert_eq!(state.result(Category::Lowes), Some(&json!({"result": "fresh"})));
    assert!(!state.is_loading(Category::Lowes));
}

#[test]
fn jobs_in_different_categories_are_independent() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::AnalyzeRequested(Category::Lowes));
    let (state, effects) = update(state, Msg::AnalyzeRequested(Category::Strategy));

    assert_eq!(
        effects,
        vec![Effect::SubmitJob {
            job_id: 2,
            category: Category::Strategy
        }]
    );
    assert!(state.is_loading(Category::Lowes));
    assert!(state.is_loading(Category::Strategy));

    let (state, _) = update(
        state,
        Msg::JobFinished {
            job_id: 1,
            outcome: JobOutcome::Failed {
                reason: "network error".to_string(),
            },
        },
    );
    assert!(!state.is_loading(Category::Lowes));
    assert!(state.is_loading(Category::Strategy));
    assert!(state.any_loading());
}

#[test]
fn discard_cancels_in_flight_job_only() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::AnalyzeRequested(Category::Competitors));

    let (state, effects) = update(state, Msg::DiscardRequested(Category::Competitors));
    assert_eq!(effects, vec![Effect::CancelJob { job_id: 1 }]);
    assert_eq!(state.phase(Category::Competitors), JobPhase::Idle);
    assert!(!state.any_loading());

    let (_state, effects) = update(state, Msg::DiscardRequested(Category::Competitors));
    assert!(effects.is_empty());
}

#[test]
fn discard_all_cancels_every_in_flight_job() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::AnalyzeRequested(Category::Competitors));
    let (state, _) = update(state, Msg::AnalyzeRequested(Category::Campaigns));

    let (state, effects) = update(state, Msg::DiscardAll);
    assert_eq!(
        effects,
        vec![
            Effect::CancelJob { job_id: 1 },
            Effect::CancelJob { job_id: 2 },
        ]
    );
    assert!(!state.is_busy());
}

#[test]
fn discard_all_stops_waiting_for_lookups() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::AnalyzeRequested(Category::Lowes));
    let (state, _) = update(state, Msg::BackendStatusRequested);
    let (state, _) = update(state, Msg::LatestResultRequested(Category::Strategy));
    assert!(state.is_busy());

    let (mut state, effects) = update(state, Msg::DiscardAll);
    assert_eq!(effects, vec![Effect::CancelJob { job_id: 1 }]);
    assert!(!state.any_loading());
    assert!(!state.is_busy());
    assert!(state.consume_dirty());

    // A late answer is still applied and does not make the store busy again.
    let (state, _) = update(
        state,
        Msg::BackendStatusLoaded(Ok(BackendStatus {
            status: "operational".into(),
            active_tasks: 0,
            completed_analyses: 3,
        })),
    );
    assert!(!state.is_busy());
    assert_eq!(
        state.backend_status().map(|status| status.completed_analyses),
        Some(3)
    );
}

#[test]
fn backend_status_round_trip_tracks_pending_queries() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::BackendStatusRequested);
    assert_eq!(effects, vec![Effect::FetchBackendStatus]);
    assert!(state.is_busy());

    let status = BackendStatus {
        status: "operational".to_string(),
        active_tasks: 2,
        completed_analyses: 7,
    };
    let (state, _) = update(state, Msg::BackendStatusLoaded(Ok(status.clone())));
    assert!(!state.is_busy());
    assert_eq!(state.backend_status(), Some(&status));
}

#[test]
fn latest_result_does_not_touch_loading_flag() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::AnalyzeRequested(Category::Strategy));
    let (state, effects) = update(state, Msg::LatestResultRequested(Category::Strategy));
    assert_eq!(
        effects,
        vec![Effect::FetchLatestResult {
            category: Category::Strategy
        }]
    );

    let payload = json!({"analysis_type": "strategy"});
    let (state, _) = update(
        state,
        Msg::LatestResultLoaded {
            category: Category::Strategy,
            result: Ok(Some(payload.clone())),
        },
    );
    assert_eq!(state.result(Category::Strategy), Some(&payload));
    assert!(state.is_loading(Category::Strategy));
}

#[test]
fn failed_lookups_become_notices() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::LatestResultRequested(Category::Lowes));
    let (state, _) = update(state, Msg::BackendStatusRequested);
    let (state, _) = update(
        state,
        Msg::LatestResultLoaded {
            category: Category::Lowes,
            result: Ok(None),
        },
    );
    let (state, _) = update(
        state,
        Msg::BackendStatusLoaded(Err("network error: connection refused".to_string())),
    );

    let view = state.view();
    assert!(!view.busy);
    assert_eq!(
        view.notices,
        vec![
            "no stored result for lowes".to_string(),
            "backend status unavailable: network error: connection refused".to_string(),
        ]
    );
    assert_eq!(view.backend, None);
}

#[test]
fn taking_notices_drains_them() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::LatestResultRequested(Category::Full));
    let (mut state, _) = update(
        state,
        Msg::LatestResultLoaded {
            category: Category::Full,
            result: Err("http status 500: boom".to_string()),
        },
    );

    assert_eq!(
        state.take_notices(),
        vec!["latest full result unavailable: http status 500: boom".to_string()]
    );
    assert!(state.take_notices().is_empty());
    assert!(state.view().notices.is_empty());
}
