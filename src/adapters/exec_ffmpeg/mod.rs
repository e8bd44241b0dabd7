//! FFmpeg execution adapter
//!
//! Runs a rendered command line through `<shell> -c` with the error stream
//! piped into the progress monitor.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::app::config::EditorConfig;
use crate::engine::execution::{Execution, ExecutionReport, ExecutionState};
use crate::engine::monitor::{drain_stream, MonitorSummary, ProgressMonitor};
use crate::error::{EditorError, EditorResult};
use crate::ports::ExecutePort;

/// Subprocess-backed execution adapter
#[derive(Debug, Clone)]
pub struct FFmpegExecAdapter {
    shell: String,
    timeout: Option<Duration>,
}

impl FFmpegExecAdapter {
    /// Create an adapter that runs commands through `shell -c`
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
            timeout: None,
        }
    }

    /// Kill any invocation still running after `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.shell.clone()).with_timeout(config.operation_timeout())
    }
}

#[async_trait]
impl ExecutePort for FFmpegExecAdapter {
    async fn execute(
        &self,
        command: &str,
        monitor: Option<ProgressMonitor>,
    ) -> EditorResult<ExecutionReport> {
        let mut execution = Execution::new();
        execution.advance(ExecutionState::Started);
        debug!(shell = %self.shell, command, "Launching transcoder");

        let spawned = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(err) => {
                execution.advance(ExecutionState::Failed);
                return Err(EditorError::Launch {
                    message: format!("could not start '{}': {}", self.shell, err),
                });
            }
        };

        let stderr = match child.stderr.take() {
            Some(stderr) => stderr,
            None => {
                execution.advance(ExecutionState::Failed);
                if let Err(err) = child.start_kill() {
                    debug!(error = %err, "Could not kill unattached transcoder");
                }
                return Err(EditorError::Launch {
                    message: "could not attach to the transcoder error stream".to_string(),
                });
            }
        };
        execution.advance(ExecutionState::Running);

        let reader = tokio::spawn(drain_stream(stderr, monitor));

        let waited = match self.timeout {
            Some(limit) => {
                let outcome = tokio::time::timeout(limit, child.wait()).await;
                match outcome {
                    Ok(waited) => waited,
                    Err(_) => {
                        warn!(seconds = limit.as_secs_f64(), command, "Transcoder timed out, killing it");
                        if let Err(err) = child.kill().await {
                            debug!(error = %err, "Kill after timeout failed");
                        }
                        reader.abort();
                        execution.advance(ExecutionState::Failed);
                        return Err(EditorError::TimedOut {
                            seconds: limit.as_secs(),
                        });
                    }
                }
            }
            None => child.wait().await,
        };

        let status = match waited {
            Ok(status) => status,
            Err(err) => {
                reader.abort();
                execution.advance(ExecutionState::Failed);
                return Err(EditorError::Io(err));
            }
        };

        // The stream closes once the process and anything it spawned exit.
        let summary = match reader.await {
            Ok(summary) => summary,
            Err(err) => {
                warn!(error = %err, "Transcoder output reader did not finish cleanly");
                MonitorSummary::default()
            }
        };

        let terminal = if status.success() {
            ExecutionState::Succeeded
        } else {
            ExecutionState::Failed
        };
        execution.advance(terminal);
        info!(
            state = %execution.state(),
            code = ?status.code(),
            elapsed_ms = execution.elapsed().as_millis() as u64,
            "Transcoder finished"
        );

        Ok(ExecutionReport {
            state: execution.state(),
            exit_code: status.code(),
            elapsed: execution.elapsed(),
            monitor: summary,
        })
    }
}
