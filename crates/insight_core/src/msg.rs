use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User asked for a new analysis of a category.
    AnalyzeRequested(crate::Category),
    /// User dismissed the in-flight job of a category.
    DiscardRequested(crate::Category),
    /// Driver is shutting down; every in-flight job is dismissed.
    DiscardAll,
    /// User asked for the backend's operational status.
    BackendStatusRequested,
    /// User asked for the latest stored result of a category.
    LatestResultRequested(crate::Category),
    /// Backend accepted a submission and assigned it a task id.
    JobSubmitted {
        job_id: crate::JobId,
        task_id: String,
    },
    /// Cosmetic animation moved to the given step index.
    StepAdvanced { job_id: crate::JobId, index: usize },
    /// A status request was issued (1-based attempt number).
    PollAttempted { job_id: crate::JobId, attempt: u32 },
    /// Engine reached a terminal state for a job.
    JobFinished {
        job_id: crate::JobId,
        outcome: crate::JobOutcome,
    },
    /// Latest stored result lookup finished. `Ok(None)` means the backend
    /// has no result for the category yet.
    LatestResultLoaded {
        category: crate::Category,
        result: Result<Option<Value>, String>,
    },
    /// Backend operational status lookup finished.
    BackendStatusLoaded(Result<crate::BackendStatus, String>),
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
