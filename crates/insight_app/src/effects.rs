use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use insight_core::{BackendStatus, Category, Effect, JobOutcome, Msg};
use insight_engine::{EngineEvent, EngineHandle};
use insight_logging::{insight_debug, insight_info, insight_warn};

/// Executes store effects on the engine and feeds engine events back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, msg_tx: mpsc::Sender<Msg>) -> Self {
        let runner = Self { engine };
        runner.spawn_event_loop(msg_tx);
        runner
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubmitJob { job_id, category } => {
                    insight_info!("SubmitJob job_id={} category={}", job_id, category);
                    self.engine.submit(
                        job_id,
                        category.as_str(),
                        category.progress_steps().len(),
                    );
                }
                Effect::CancelJob { job_id } => {
                    insight_info!("CancelJob job_id={}", job_id);
                    self.engine.cancel(job_id);
                }
                Effect::FetchBackendStatus => self.engine.fetch_system_status(),
                Effect::FetchLatestResult { category } => {
                    self.engine.fetch_latest(category.as_str())
                }
            }
        }
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            let Some(event) = engine.recv_timeout(Duration::from_millis(100)) else {
                continue;
            };
            let Some(msg) = engine_event_to_msg(event) else {
                continue;
            };
            if msg_tx.send(msg).is_err() {
                insight_debug!("Message channel closed; stopping engine event loop");
                break;
            }
        });
    }
}

/// Translates an engine event into the store's vocabulary.
pub fn engine_event_to_msg(event: EngineEvent) -> Option<Msg> {
    let msg = match event {
        EngineEvent::Submitted { job_id, task_id } => Msg::JobSubmitted {
            job_id,
            task_id: task_id.into_string(),
        },
        EngineEvent::StepAdvanced { job_id, index } => Msg::StepAdvanced { job_id, index },
        EngineEvent::PollAttempted { job_id, attempt } => Msg::PollAttempted { job_id, attempt },
        EngineEvent::JobCompleted { job_id, result } => {
            let outcome = match result {
                Ok(insight_engine::JobOutcome::Completed(payload)) => {
                    JobOutcome::Completed(payload)
                }
                Ok(insight_engine::JobOutcome::TimedOut { attempts }) => {
                    JobOutcome::TimedOut { attempts }
                }
                Ok(insight_engine::JobOutcome::UnexpectedStatus(status)) => JobOutcome::Failed {
                    reason: format!("unexpected status `{status}`"),
                },
                Err(err) => {
                    insight_warn!("Job {} failed: {}", job_id, err);
                    JobOutcome::Failed {
                        reason: err.to_string(),
                    }
                }
            };
            Msg::JobFinished { job_id, outcome }
        }
        EngineEvent::SystemStatus(result) => Msg::BackendStatusLoaded(
            result
                .map(|status| BackendStatus {
                    status: status.status,
                    active_tasks: status.active_tasks,
                    completed_analyses: status.completed_analyses,
                })
                .map_err(|err| err.to_string()),
        ),
        EngineEvent::LatestResult { category, result } => {
            let category = match category.parse::<Category>() {
                Ok(category) => category,
                Err(err) => {
                    insight_warn!("Dropping latest result: {}", err);
                    return None;
                }
            };
            Msg::LatestResultLoaded {
                category,
                result: result.map_err(|err| err.to_string()),
            }
        }
    };
    Some(msg)
}
