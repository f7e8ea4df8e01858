#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use insight_engine::{
    AnalysisBackend, ClientError, EngineEvent, EngineHandle, FailureKind, JobStatus,
    ProgressSink, SystemStatus, TaskId,
};
use serde_json::Value;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(insight_logging::initialize_for_tests);
}

/// Records every event together with the (possibly paused) tokio clock.
#[derive(Default, Clone)]
pub struct TestSink {
    events: Arc<Mutex<Vec<(tokio::time::Instant, EngineEvent)>>>,
}

impl TestSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<EngineEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub fn timed_events(&self) -> Vec<(tokio::time::Instant, EngineEvent)> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events
            .lock()
            .unwrap()
            .push((tokio::time::Instant::now(), event));
    }
}

/// In-memory backend that replays scripted status responses. Once the script
/// runs out every further poll reports `running`.
pub struct ScriptedBackend {
    submit: Result<TaskId, ClientError>,
    statuses: Mutex<VecDeque<Result<JobStatus, ClientError>>>,
    status_calls: AtomicU32,
    submit_calls: AtomicU32,
}

impl ScriptedBackend {
    pub fn new(task_id: &str) -> Self {
        Self {
            submit: Ok(TaskId::new(task_id)),
            statuses: Mutex::new(VecDeque::new()),
            status_calls: AtomicU32::new(0),
            submit_calls: AtomicU32::new(0),
        }
    }

    pub fn failing_submit(kind: FailureKind) -> Self {
        Self {
            submit: Err(ClientError::new(kind, "scripted submit failure")),
            ..Self::new("unused")
        }
    }

    pub fn then(self, status: Result<JobStatus, ClientError>) -> Self {
        self.statuses.lock().unwrap().push_back(status);
        self
    }

    pub fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> u32 {
        self.submit_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AnalysisBackend for ScriptedBackend {
    async fn submit(&self, _category: &str) -> Result<TaskId, ClientError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submit.clone()
    }

    async fn job_status(&self, _task_id: &TaskId) -> Result<JobStatus, ClientError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(JobStatus::Running))
    }

    async fn system_status(&self) -> Result<SystemStatus, ClientError> {
        Ok(SystemStatus {
            status: "operational".to_string(),
            active_tasks: 0,
            completed_analyses: 0,
            agents: None,
        })
    }

    async fn latest_result(&self, _category: &str) -> Result<Option<Value>, ClientError> {
        Ok(None)
    }
}

/// Waits for events until `done` accepts one or the deadline passes.
pub async fn collect_until(
    handle: &EngineHandle,
    timeout: Duration,
    done: impl Fn(&EngineEvent) -> bool,
) -> Vec<EngineEvent> {
    let deadline = std::time::Instant::now() + timeout;
    let mut events = Vec::new();
    while std::time::Instant::now() < deadline {
        match handle.try_recv() {
            Some(event) => {
                let finished = done(&event);
                events.push(event);
                if finished {
                    return events;
                }
            }
            None => tokio::time::sleep(Duration::from_millis(5)).await,
        }
    }
    panic!("timed out waiting for engine events; got {events:?}");
}
