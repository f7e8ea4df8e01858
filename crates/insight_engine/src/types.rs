use std::fmt;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub type JobId = u64;

/// Opaque identifier the backend assigns to one submitted job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status reported by `GET /api/results/{task_id}`.
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    Running,
    Completed(Value),
    /// Anything else, including a missing status field.
    Other(String),
}

/// Body of `GET /api/status`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SystemStatus {
    pub status: String,
    #[serde(default)]
    pub active_tasks: u64,
    #[serde(default)]
    pub completed_analyses: u64,
    #[serde(default)]
    pub agents: Option<Value>,
}

/// How a poll loop ended when every request succeeded.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Completed(Value),
    TimedOut { attempts: u32 },
    UnexpectedStatus(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Submitted {
        job_id: JobId,
        task_id: TaskId,
    },
    StepAdvanced {
        job_id: JobId,
        index: usize,
    },
    PollAttempted {
        job_id: JobId,
        attempt: u32,
    },
    JobCompleted {
        job_id: JobId,
        result: Result<JobOutcome, ClientError>,
    },
    SystemStatus(Result<SystemStatus, ClientError>),
    LatestResult {
        category: String,
        result: Result<Option<Value>, ClientError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ClientError {
    pub kind: FailureKind,
    pub message: String,
}

impl ClientError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn cancelled() -> Self {
        Self::new(FailureKind::Cancelled, "job was cancelled")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Decode,
    MissingTaskId,
    Cancelled,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::MissingTaskId => write!(f, "missing task id"),
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
