use std::collections::HashMap;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use insight_logging::{insight_debug, insight_error, insight_info, insight_warn};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::animate::{animate_steps, StepTiming};
use crate::client::{AnalysisBackend, ClientSettings, ReqwestBackend};
use crate::poll::{poll_until_done, PollSettings};
use crate::sink::{ChannelProgressSink, ProgressSink};
use crate::{ClientError, EngineEvent, FailureKind, JobId, JobOutcome};

#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub client: ClientSettings,
    pub poll: PollSettings,
    pub steps: StepTiming,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("backend client: {0}")]
    Client(#[from] ClientError),
    #[error("async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

enum EngineCommand {
    Submit {
        job_id: JobId,
        category: String,
        step_count: usize,
    },
    Cancel {
        job_id: JobId,
    },
    FetchSystemStatus,
    FetchLatest {
        category: String,
    },
}

type JobTokens = Arc<Mutex<HashMap<JobId, CancellationToken>>>;

/// Handle to the engine thread. Commands are queued; results come back as
/// [`EngineEvent`]s. Dropping every clone stops the engine and cancels all
/// jobs still in flight.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(settings: EngineSettings) -> Result<Self, EngineError> {
        let backend = Arc::new(ReqwestBackend::new(settings.client.clone())?);
        Self::with_backend(backend, settings)
    }

    pub fn with_backend(
        backend: Arc<dyn AnalysisBackend>,
        settings: EngineSettings,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;
        let settings = Arc::new(settings);

        thread::spawn(move || {
            let tokens: JobTokens = Arc::new(Mutex::new(HashMap::new()));
            while let Ok(command) = cmd_rx.recv() {
                let backend = backend.clone();
                let settings = settings.clone();
                let event_tx = event_tx.clone();
                let tokens = tokens.clone();
                handle_command(&runtime, backend, settings, tokens, command, event_tx);
            }
            if let Ok(tokens) = tokens.lock() {
                for token in tokens.values() {
                    token.cancel();
                }
            }
            insight_debug!("Engine command channel closed; shutting down");
        });

        Ok(Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        })
    }

    /// Starts a job: submit, then animate `step_count` steps while polling.
    pub fn submit(&self, job_id: JobId, category: impl Into<String>, step_count: usize) {
        let _ = self.cmd_tx.send(EngineCommand::Submit {
            job_id,
            category: category.into(),
            step_count,
        });
    }

    pub fn cancel(&self, job_id: JobId) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel { job_id });
    }

    pub fn fetch_system_status(&self) {
        let _ = self.cmd_tx.send(EngineCommand::FetchSystemStatus);
    }

    pub fn fetch_latest(&self, category: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::FetchLatest {
            category: category.into(),
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }
}

fn handle_command(
    runtime: &tokio::runtime::Runtime,
    backend: Arc<dyn AnalysisBackend>,
    settings: Arc<EngineSettings>,
    tokens: JobTokens,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Submit {
            job_id,
            category,
            step_count,
        } => {
            let cancel = CancellationToken::new();
            if let Ok(mut tokens) = tokens.lock() {
                tokens.insert(job_id, cancel.clone());
            }
            runtime.spawn(async move {
                let sink = ChannelProgressSink::new(event_tx);
                let result = run_job(
                    backend.as_ref(),
                    &settings,
                    job_id,
                    &category,
                    step_count,
                    &sink,
                    &cancel,
                )
                .await;
                log_outcome(job_id, &category, &result);
                if let Ok(mut tokens) = tokens.lock() {
                    tokens.remove(&job_id);
                }
                sink.emit(EngineEvent::JobCompleted { job_id, result });
            });
        }
        EngineCommand::Cancel { job_id } => {
            let token = tokens.lock().ok().and_then(|tokens| tokens.get(&job_id).cloned());
            match token {
                Some(token) => {
                    insight_info!("Cancelling job {}", job_id);
                    token.cancel();
                }
                None => insight_debug!("Cancel for job {} which is not running", job_id),
            }
        }
        EngineCommand::FetchSystemStatus => {
            runtime.spawn(async move {
                let result = backend.system_status().await;
                let _ = event_tx.send(EngineEvent::SystemStatus(result));
            });
        }
        EngineCommand::FetchLatest { category } => {
            runtime.spawn(async move {
                let result = backend.latest_result(&category).await;
                let _ = event_tx.send(EngineEvent::LatestResult { category, result });
            });
        }
    }
}

async fn run_job(
    backend: &dyn AnalysisBackend,
    settings: &EngineSettings,
    job_id: JobId,
    category: &str,
    step_count: usize,
    sink: &dyn ProgressSink,
    cancel: &CancellationToken,
) -> Result<JobOutcome, ClientError> {
    insight_info!("Submitting {} analysis as job {}", category, job_id);
    let task_id = tokio::select! {
        _ = cancel.cancelled() => return Err(ClientError::cancelled()),
        task_id = backend.submit(category) => task_id?,
    };
    insight_info!("Job {} accepted as task {}", job_id, task_id);
    sink.emit(EngineEvent::Submitted {
        job_id,
        task_id: task_id.clone(),
    });

    // Ending the poll loop also ends the animation.
    let animation_cancel = cancel.child_token();
    let animation = animate_steps(job_id, step_count, &settings.steps, sink, &animation_cancel);
    let polling = async {
        let outcome =
            poll_until_done(backend, job_id, &task_id, &settings.poll, sink, cancel).await;
        animation_cancel.cancel();
        outcome
    };
    let ((), outcome) = tokio::join!(animation, polling);
    outcome
}

fn log_outcome(job_id: JobId, category: &str, result: &Result<JobOutcome, ClientError>) {
    match result {
        Ok(JobOutcome::Completed(_)) => {
            insight_info!("Job {} ({}) completed", job_id, category)
        }
        Ok(JobOutcome::TimedOut { attempts }) => insight_warn!(
            "Job {} ({}) still running after {} polls; giving up",
            job_id,
            category,
            attempts
        ),
        Ok(JobOutcome::UnexpectedStatus(status)) => insight_warn!(
            "Job {} ({}) reported unexpected status {:?}",
            job_id,
            category,
            status
        ),
        Err(err) if err.kind == FailureKind::Cancelled => {
            insight_info!("Job {} ({}) cancelled", job_id, category)
        }
        Err(err) => insight_error!("Job {} ({}) failed: {}", job_id, category, err),
    }
}
