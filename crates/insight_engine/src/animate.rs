use std::time::Duration;

use insight_logging::insight_trace;
use rand::Rng;
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, JobId, ProgressSink};

/// Bounds of the random pause between two cosmetic progress steps.
#[derive(Debug, Clone)]
pub struct StepTiming {
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for StepTiming {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(500),
            max_delay: Duration::from_millis(1500),
        }
    }
}

impl StepTiming {
    /// Uniformly distributed in `[min_delay, max_delay]`.
    pub fn next_delay(&self) -> Duration {
        if self.max_delay <= self.min_delay {
            return self.min_delay;
        }
        rand::thread_rng().gen_range(self.min_delay..=self.max_delay)
    }
}

/// Publishes step indices `0..step_count` in order, pausing a random
/// [`StepTiming`] delay after each one.
///
/// The animation is decorative: it knows nothing about the real job and may
/// finish before or after it. Cancelling the token stops it at the next pause.
pub async fn animate_steps(
    job_id: JobId,
    step_count: usize,
    timing: &StepTiming,
    sink: &dyn ProgressSink,
    cancel: &CancellationToken,
) {
    for index in 0..step_count {
        if cancel.is_cancelled() {
            return;
        }
        sink.emit(EngineEvent::StepAdvanced { job_id, index });
        let delay = timing.next_delay();
        insight_trace!("Job {} step {} shown for {:?}", job_id, index, delay);
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }
    }
}
