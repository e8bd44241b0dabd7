// Ports - Interface definitions (contracts)

use async_trait::async_trait;

use crate::engine::execution::ExecutionReport;
use crate::engine::monitor::ProgressMonitor;
use crate::error::EditorResult;

/// Port for running one rendered transcoder command line
#[async_trait]
pub trait ExecutePort: Send + Sync {
    /// Run `command` to completion.
    ///
    /// Returns `Err(Launch)` when the process or its error stream cannot be
    /// set up and `Err(TimedOut)` when a deadline expires. A process that
    /// ran but exited unsuccessfully still yields a report in the `Failed`
    /// state; see [`ExecutionReport::into_result`].
    async fn execute(
        &self,
        command: &str,
        monitor: Option<ProgressMonitor>,
    ) -> EditorResult<ExecutionReport>;
}
