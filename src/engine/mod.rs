//! Execution and monitoring pipeline
//!
//! The executor itself lives behind [`crate::ports::ExecutePort`]; this
//! module holds what every executor shares: the per-invocation state
//! machine, the stderr progress scanner, outward events and the batch
//! fan-out used for lossless exports.

pub mod batch;
pub mod execution;
pub mod monitor;
pub mod progress;

pub use batch::{with_distinct_names, BatchSummary, LosslessBatch};
pub use execution::{Execution, ExecutionReport, ExecutionState};
pub use monitor::{drain_stream, MonitorSummary, ProgressKey, ProgressMonitor};
pub use progress::{EditorEvent, EventSink, JsonEventPrinter};
