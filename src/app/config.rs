//! Editor configuration: defaults, environment overrides and validation

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EditorError, EditorResult};
use crate::utils::logging::{LogFormat, LogLevel, LoggingConfig};

/// Environment variables read by [`EditorConfig::apply_env`]
pub const ENV_FFMPEG_PATH: &str = "REELCUT_FFMPEG_PATH";
pub const ENV_SHELL: &str = "REELCUT_SHELL";
pub const ENV_PROJECT_DIR: &str = "REELCUT_PROJECT_DIR";
pub const ENV_MAX_JOBS: &str = "REELCUT_MAX_JOBS";
pub const ENV_TIMEOUT_SECS: &str = "REELCUT_TIMEOUT_SECS";
pub const ENV_LOG_LEVEL: &str = "REELCUT_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "REELCUT_LOG_FORMAT";

/// Runtime settings for the editor and its executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Transcoder binary placed at the head of every command
    pub ffmpeg_path: String,
    /// Shell used as `<shell> -c <command>`
    pub shell: String,
    /// Default input and output directory
    pub project_dir: PathBuf,
    /// Upper bound on concurrent batch subprocesses
    pub max_concurrent_jobs: usize,
    /// Per-operation deadline; none means wait indefinitely
    pub operation_timeout_secs: Option<u64>,
    /// Capacity of the event channel
    pub event_buffer: usize,
    pub log_level: LogLevel,
    pub log_format: LogFormat,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            shell: "sh".to_string(),
            project_dir: PathBuf::from("."),
            max_concurrent_jobs: num_cpus::get().max(1),
            operation_timeout_secs: None,
            event_buffer: 256,
            log_level: LogLevel::Info,
            log_format: LogFormat::Compact,
        }
    }
}

impl EditorConfig {
    pub fn operation_timeout(&self) -> Option<Duration> {
        self.operation_timeout_secs.map(Duration::from_secs)
    }

    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.log_level,
            format: self.log_format,
        }
    }

    /// Override fields from `REELCUT_*` variables; returns how many applied
    pub fn apply_env(&mut self) -> EditorResult<usize> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Same as [`apply_env`](Self::apply_env) with an injectable lookup
    pub fn apply_vars<F>(&mut self, lookup: F) -> EditorResult<usize>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = 0;

        if let Some(value) = lookup(ENV_FFMPEG_PATH) {
            self.ffmpeg_path = value;
            applied += 1;
        }
        if let Some(value) = lookup(ENV_SHELL) {
            self.shell = value;
            applied += 1;
        }
        if let Some(value) = lookup(ENV_PROJECT_DIR) {
            self.project_dir = PathBuf::from(value);
            applied += 1;
        }
        if let Some(value) = lookup(ENV_MAX_JOBS) {
            self.max_concurrent_jobs = parse_env(ENV_MAX_JOBS, &value)?;
            applied += 1;
        }
        if let Some(value) = lookup(ENV_TIMEOUT_SECS) {
            self.operation_timeout_secs = Some(parse_env(ENV_TIMEOUT_SECS, &value)?);
            applied += 1;
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            self.log_level = value.parse().map_err(|message| EditorError::Config { message })?;
            applied += 1;
        }
        if let Some(value) = lookup(ENV_LOG_FORMAT) {
            self.log_format = value.parse().map_err(|message| EditorError::Config { message })?;
            applied += 1;
        }

        if applied > 0 {
            info!("Applied {} environment variable overrides", applied);
        }
        Ok(applied)
    }

    /// Reject settings the editor cannot run with
    pub fn validate(&self) -> EditorResult<()> {
        if self.ffmpeg_path.trim().is_empty() {
            return Err(config_error("ffmpeg_path cannot be empty"));
        }
        if self.shell.trim().is_empty() {
            return Err(config_error("shell cannot be empty"));
        }
        if self.max_concurrent_jobs == 0 {
            return Err(config_error("max_concurrent_jobs must be at least 1"));
        }
        if self.event_buffer == 0 {
            return Err(config_error("event_buffer must be at least 1"));
        }
        if self.operation_timeout_secs == Some(0) {
            return Err(config_error("operation_timeout_secs must be positive"));
        }
        Ok(())
    }
}

fn config_error(message: &str) -> EditorError {
    EditorError::Config {
        message: message.to_string(),
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> EditorResult<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| EditorError::Config {
        message: format!("{}='{}': {}", key, value, e),
    })
}
