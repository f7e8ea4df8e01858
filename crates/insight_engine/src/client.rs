use std::time::Duration;

use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::{ClientError, FailureKind, JobStatus, SystemStatus, TaskId};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8002".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

/// The analysis backend as seen by the poller.
#[async_trait::async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// `POST /api/analyze/{category}`.
    async fn submit(&self, category: &str) -> Result<TaskId, ClientError>;

    /// `GET /api/results/{task_id}`.
    async fn job_status(&self, task_id: &TaskId) -> Result<JobStatus, ClientError>;

    /// `GET /api/status`.
    async fn system_status(&self) -> Result<SystemStatus, ClientError>;

    /// `GET /api/results/latest/{category}`. `None` when nothing is stored yet.
    async fn latest_result(&self, category: &str) -> Result<Option<Value>, ClientError>;
}

#[derive(Deserialize)]
struct SubmitBody {
    #[serde(default)]
    task_id: Option<String>,
}

#[derive(Deserialize)]
struct ResultsBody {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    results: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        // Reject a bad base url up front rather than on the first submission.
        reqwest::Url::parse(&settings.base_url)
            .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ClientError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self { settings, client })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url, ClientError> {
        let mut url = reqwest::Url::parse(&self.settings.base_url)
            .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::new(FailureKind::InvalidUrl, "base url cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(ClientError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(ClientError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        serde_json::from_slice(&bytes)
            .map_err(|err| ClientError::new(FailureKind::Decode, err.to_string()))
    }
}

#[async_trait::async_trait]
impl AnalysisBackend for ReqwestBackend {
    async fn submit(&self, category: &str) -> Result<TaskId, ClientError> {
        let url = self.endpoint(&["api", "analyze", category])?;
        let body: SubmitBody = self.read_json(self.client.post(url)).await?;
        match body.task_id {
            Some(task_id) if !task_id.is_empty() => Ok(TaskId::new(task_id)),
            _ => Err(ClientError::new(
                FailureKind::MissingTaskId,
                format!("submission of `{category}` returned no task_id"),
            )),
        }
    }

    async fn job_status(&self, task_id: &TaskId) -> Result<JobStatus, ClientError> {
        let url = self.endpoint(&["api", "results", task_id.as_str()])?;
        let body: ResultsBody = self.read_json(self.client.get(url)).await?;
        Ok(match body.status.as_deref() {
            Some("running") => JobStatus::Running,
            Some("completed") => JobStatus::Completed(body.results.unwrap_or(Value::Null)),
            Some(other) => JobStatus::Other(other.to_string()),
            None => JobStatus::Other(String::new()),
        })
    }

    async fn system_status(&self) -> Result<SystemStatus, ClientError> {
        let url = self.endpoint(&["api", "status"])?;
        self.read_json(self.client.get(url)).await
    }

    async fn latest_result(&self, category: &str) -> Result<Option<Value>, ClientError> {
        let url = self.endpoint(&["api", "results", "latest", category])?;
        let body: ResultsBody = self.read_json(self.client.get(url)).await?;
        match body.status.as_deref() {
            Some("success") => Ok(body.results),
            Some("not_found") => Ok(None),
            other => Err(ClientError::new(
                FailureKind::Decode,
                format!("unexpected latest-result status {other:?}"),
            )),
        }
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ClientError::new(FailureKind::Decode, err.to_string());
    }
    ClientError::new(FailureKind::Network, err.to_string())
}
