use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use insight_engine::{ClientSettings, EngineSettings, PollSettings, StepTiming};
use insight_logging::insight_info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "insight.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// On-disk settings. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub max_poll_attempts: u32,
    pub step_delay_min_ms: u64,
    pub step_delay_max_ms: u64,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub max_response_bytes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let settings = EngineSettings::default();
        Self {
            base_url: settings.client.base_url,
            poll_interval_ms: millis(settings.poll.interval),
            max_poll_attempts: settings.poll.max_attempts,
            step_delay_min_ms: millis(settings.steps.min_delay),
            step_delay_max_ms: millis(settings.steps.max_delay),
            connect_timeout_ms: millis(settings.client.connect_timeout),
            request_timeout_ms: millis(settings.client.request_timeout),
            max_response_bytes: settings.client.max_bytes,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("base_url is empty".into()));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must be positive".into()));
        }
        if self.max_poll_attempts == 0 {
            return Err(ConfigError::Invalid("max_poll_attempts must be at least 1".into()));
        }
        if self.step_delay_min_ms > self.step_delay_max_ms {
            return Err(ConfigError::Invalid(format!(
                "step_delay_min_ms ({}) exceeds step_delay_max_ms ({})",
                self.step_delay_min_ms, self.step_delay_max_ms
            )));
        }
        Ok(())
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            client: ClientSettings {
                base_url: self.base_url.clone(),
                connect_timeout: Duration::from_millis(self.connect_timeout_ms),
                request_timeout: Duration::from_millis(self.request_timeout_ms),
                max_bytes: self.max_response_bytes,
            },
            poll: PollSettings {
                interval: Duration::from_millis(self.poll_interval_ms),
                max_attempts: self.max_poll_attempts,
            },
            steps: StepTiming {
                min_delay: Duration::from_millis(self.step_delay_min_ms),
                max_delay: Duration::from_millis(self.step_delay_max_ms),
            },
        }
    }
}

/// Loads the config file.
///
/// An explicit `path` must exist. Without one, `./insight.ron` is used when
/// present and built-in defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound && !required => {
            return Ok(AppConfig::default());
        }
        Err(source) => return Err(ConfigError::Read { path, source }),
    };

    let config: AppConfig = ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    config.validate()?;

    insight_info!("Loaded config from {:?}", path);
    Ok(config)
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
