use std::time::Duration;

use insight_logging::{insight_debug, insight_info};
use tokio_util::sync::CancellationToken;

use crate::{
    AnalysisBackend, ClientError, EngineEvent, JobId, JobOutcome, JobStatus, ProgressSink, TaskId,
};

#[derive(Debug, Clone)]
pub struct PollSettings {
    pub interval: Duration,
    /// Upper bound on status requests for one job, the first one included.
    pub max_attempts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 60,
        }
    }
}

/// Polls the status of `task_id` until it leaves the `running` state.
///
/// The first request goes out immediately, later ones every
/// `settings.interval`. A job still running after `max_attempts` requests
/// ends as [`JobOutcome::TimedOut`]. A transport or decode failure ends the
/// loop at once with no retry.
pub async fn poll_until_done(
    backend: &dyn AnalysisBackend,
    job_id: JobId,
    task_id: &TaskId,
    settings: &PollSettings,
    sink: &dyn ProgressSink,
    cancel: &CancellationToken,
) -> Result<JobOutcome, ClientError> {
    let max_attempts = settings.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        sink.emit(EngineEvent::PollAttempted { job_id, attempt });

        let status = tokio::select! {
            _ = cancel.cancelled() => return Err(ClientError::cancelled()),
            status = backend.job_status(task_id) => status?,
        };

        match status {
            JobStatus::Completed(payload) => return Ok(JobOutcome::Completed(payload)),
            JobStatus::Running if attempt < max_attempts => {
                insight_debug!(
                    "Job {} task {} still running after attempt {}/{}",
                    job_id,
                    task_id,
                    attempt,
                    max_attempts
                );
                tokio::select! {
                    _ = cancel.cancelled() => return Err(ClientError::cancelled()),
                    _ = tokio::time::sleep(settings.interval) => {}
                }
            }
            JobStatus::Running => {
                insight_info!(
                    "Job {} task {} gave up after {} attempts",
                    job_id,
                    task_id,
                    attempt
                );
                return Ok(JobOutcome::TimedOut { attempts: attempt });
            }
            JobStatus::Other(status) => return Ok(JobOutcome::UnexpectedStatus(status)),
        }
    }
}
