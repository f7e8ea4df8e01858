//! Insight engine: backend HTTP client, poll loop and effect execution.
mod animate;
mod client;
mod engine;
mod poll;
mod sink;
mod types;

pub use animate::{animate_steps, StepTiming};
pub use client::{AnalysisBackend, ClientSettings, ReqwestBackend};
pub use engine::{EngineError, EngineHandle, EngineSettings};
pub use poll::{poll_until_done, PollSettings};
pub use sink::{ChannelProgressSink, ProgressSink};
pub use types::{
    ClientError, EngineEvent, FailureKind, JobId, JobOutcome, JobStatus, SystemStatus, TaskId,
};
