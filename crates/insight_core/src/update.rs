use insight_logging::insight_debug;

use crate::{AppState, Category, Effect, JobId, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::AnalyzeRequested(category) => {
            // A resubmission supersedes the in-flight job; its late events are dropped by id.
            let (job_id, superseded) = state.begin_job(category);
            let mut effects = Vec::with_capacity(2);
            if let Some(previous) = superseded {
                effects.push(Effect::CancelJob { job_id: previous });
            }
            effects.push(Effect::SubmitJob { job_id, category });
            effects
        }
        Msg::DiscardRequested(category) => state
            .discard(category)
            .map(|job_id| vec![Effect::CancelJob { job_id }])
            .unwrap_or_default(),
        Msg::DiscardAll => {
            state.abandon_queries();
            Category::ALL
                .into_iter()
                .filter_map(|category| state.discard(category))
                .map(|job_id| Effect::CancelJob { job_id })
                .collect()
        }
        Msg::BackendStatusRequested => {
            state.begin_query();
            vec![Effect::FetchBackendStatus]
        }
        Msg::LatestResultRequested(category) => {
            state.begin_query();
            vec![Effect::FetchLatestResult { category }]
        }
        Msg::JobSubmitted { job_id, task_id } => {
            let accepted = state.apply_submitted(job_id, task_id);
            log_if_stale(accepted, job_id, "submission");
            Vec::new()
        }
        Msg::StepAdvanced { job_id, index } => {
            let accepted = state.apply_step(job_id, index);
            log_if_stale(accepted, job_id, "step");
            Vec::new()
        }
        Msg::PollAttempted { job_id, attempt } => {
            let accepted = state.apply_poll_attempt(job_id, attempt);
            log_if_stale(accepted, job_id, "poll attempt");
            Vec::new()
        }
        Msg::JobFinished { job_id, outcome } => {
            let accepted = state.apply_finished(job_id, outcome);
            log_if_stale(accepted, job_id, "completion");
            Vec::new()
        }
        Msg::LatestResultLoaded { category, result } => {
            state.apply_latest(category, result);
            Vec::new()
        }
        Msg::BackendStatusLoaded(result) => {
            state.apply_backend_status(result);
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn log_if_stale(accepted: bool, job_id: JobId, what: &str) {
    if !accepted {
        insight_debug!("Ignoring {} for superseded job {}", what, job_id);
    }
}
