// Per-invocation execution state

use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::monitor::MonitorSummary;
use crate::error::{EditorError, EditorResult};

/// Lifecycle of one subprocess invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Idle,
    Started,
    Running,
    Succeeded,
    Failed,
}

impl ExecutionState {
    /// Allowed forward moves: Idle → Started → Running → {Succeeded | Failed},
    /// plus Started → Failed when launch or stream attachment fails.
    pub fn can_advance_to(self, next: ExecutionState) -> bool {
        use ExecutionState::*;
        matches!(
            (self, next),
            (Idle, Started)
                | (Started, Running)
                | (Started, Failed)
                | (Running, Succeeded)
                | (Running, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ExecutionState::Succeeded | ExecutionState::Failed)
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutionState::Idle => "idle",
            ExecutionState::Started => "started",
            ExecutionState::Running => "running",
            ExecutionState::Succeeded => "succeeded",
            ExecutionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Tracks the state of one invocation and how long it has taken
#[derive(Debug)]
pub struct Execution {
    state: ExecutionState,
    history: Vec<ExecutionState>,
    started_at: Instant,
}

impl Default for Execution {
    fn default() -> Self {
        Self::new()
    }
}

impl Execution {
    pub fn new() -> Self {
        Self {
            state: ExecutionState::Idle,
            history: vec![ExecutionState::Idle],
            started_at: Instant::now(),
        }
    }

    pub fn state(&self) -> ExecutionState {
        self.state
    }

    /// States visited so far, starting with Idle
    pub fn history(&self) -> &[ExecutionState] {
        &self.history
    }

    /// Move to `next`; refused moves are logged and leave the state alone
    pub fn advance(&mut self, next: ExecutionState) -> bool {
        if !self.state.can_advance_to(next) {
            warn!(from = %self.state, to = %next, "Ignoring invalid execution transition");
            return false;
        }
        debug!(from = %self.state, to = %next, "Execution state change");
        if next == ExecutionState::Started {
            self.started_at = Instant::now();
        }
        self.state = next;
        self.history.push(next);
        true
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// What a finished invocation reports back
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    /// Terminal state, decided by the exit status alone
    pub state: ExecutionState,
    pub exit_code: Option<i32>,
    pub elapsed: Duration,
    pub monitor: MonitorSummary,
}

impl ExecutionReport {
    pub fn succeeded(&self) -> bool {
        self.state == ExecutionState::Succeeded
    }

    /// Turn a failed run into an [`EditorError::Execution`]
    pub fn into_result(self) -> EditorResult<Self> {
        if self.succeeded() {
            return Ok(self);
        }
        let status = match self.exit_code {
            Some(code) => format!("exit code {}", code),
            None => "a signal".to_string(),
        };
        let message = if self.monitor.tail.is_empty() {
            "no diagnostic output".to_string()
        } else {
            self.monitor.tail.join("\n")
        };
        Err(EditorError::Execution { status, message })
    }
}
