use crate::{Category, JobId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Submit a new analysis job and start its animation and poll loop.
    SubmitJob { job_id: JobId, category: Category },
    /// Stop the timers and requests of a job that is no longer wanted.
    CancelJob { job_id: JobId },
    /// Ask the backend for its operational status.
    FetchBackendStatus,
    /// Ask the backend for the most recent stored result of a category.
    FetchLatestResult { category: Category },
}
