//! Concurrent lossless export of flagged timeline nodes

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::progress::{EditorEvent, EventSink};
use crate::domain::model::{ProcessingOpts, ProcessingResult, VideoNode};
use crate::error::EditorError;
use crate::ports::ExecutePort;
use crate::query::Query;

/// Totals for one batch run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    /// Subprocesses actually started
    pub launched: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Results in the order they were reported
    pub results: Vec<ProcessingResult>,
}

/// Fan-out/fan-in runner for lossless cuts
pub struct LosslessBatch {
    executor: Arc<dyn ExecutePort>,
    program: String,
    max_concurrent: usize,
}

impl LosslessBatch {
    pub fn new(executor: Arc<dyn ExecutePort>, program: impl Into<String>, max_concurrent: usize) -> Self {
        Self {
            executor,
            program: program.into(),
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Cut every node flagged for lossless export, at most `max_concurrent`
    /// at a time.
    ///
    /// Each worker gets its own copy of `opts` with the filename set to the
    /// node name. Repeated names, as left behind by a split, get `_2`, `_3`,
    /// ... appended so no two cuts share an output file. Results funnel
    /// through one channel into `sink`; a failing node is reported and never
    /// stops its siblings. Returns once every worker has reported.
    pub async fn run(&self, nodes: &[VideoNode], opts: &ProcessingOpts, sink: &EventSink) -> BatchSummary {
        let flagged = with_distinct_names(nodes.iter().filter(|n| n.lossless_export));
        info!(total = nodes.len(), flagged = flagged.len(), "Starting lossless batch export");

        let permits = Arc::new(Semaphore::new(self.max_concurrent));
        let (tx, mut rx) = mpsc::channel::<(ProcessingResult, bool)>(flagged.len().max(1));
        let mut workers = JoinSet::new();

        for node in flagged {
            let mut worker_opts = opts.clone();
            worker_opts.filename = node.name.clone();
            let executor = Arc::clone(&self.executor);
            let permits = Arc::clone(&permits);
            let program = self.program.clone();
            let tx = tx.clone();

            workers.spawn(async move {
                let outcome = cut_one(executor, permits, program, node, worker_opts).await;
                if tx.send(outcome).await.is_err() {
                    warn!("Batch result channel closed early");
                }
            });
        }
        drop(tx);

        let mut summary = BatchSummary::default();
        while let Some((result, launched)) = rx.recv().await {
            if launched {
                summary.launched += 1;
            }
            if result.is_success() {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
            }
            sink.emit(EditorEvent::OperationResult(result.clone())).await;
            summary.results.push(result);
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(err) = joined {
                warn!(error = %err, "Lossless worker panicked");
            }
        }

        info!(
            launched = summary.launched,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Lossless batch export finished"
        );
        summary
    }
}

/// Clone `nodes`, renaming repeats to `name_2`, `name_3`, ...
pub fn with_distinct_names<'a>(nodes: impl IntoIterator<Item = &'a VideoNode>) -> Vec<VideoNode> {
    let mut taken = HashSet::new();
    nodes
        .into_iter()
        .map(|node| {
            let mut node = node.clone();
            node.name = unique_name(&mut taken, &node.name);
            node
        })
        .collect()
}

fn unique_name(taken: &mut HashSet<String>, name: &str) -> String {
    let mut candidate = name.to_string();
    let mut suffix = 2;
    while !taken.insert(candidate.clone()) {
        candidate = format!("{}_{}", name, suffix);
        suffix += 1;
    }
    candidate
}

/// Validate, launch and report one node. The flag says whether a
/// subprocess was started.
async fn cut_one(
    executor: Arc<dyn ExecutePort>,
    permits: Arc<Semaphore>,
    program: String,
    node: VideoNode,
    opts: ProcessingOpts,
) -> (ProcessingResult, bool) {
    let (id, name) = (node.id.clone(), node.name.clone());
    let query = Query::LosslessCut { node, opts };

    let command = match query.build() {
        Ok(mut command) => {
            command.program = program;
            command.render()
        }
        Err(err) => {
            warn!(node = %id, error = %err, "Skipping node that failed validation");
            return (ProcessingResult::failed(id, name, err.to_string()), false);
        }
    };
    let output = query.output_file().unwrap_or_default();

    let _permit = match permits.acquire_owned().await {
        Ok(permit) => permit,
        Err(err) => {
            return (ProcessingResult::failed(id, name, err.to_string()), false);
        }
    };
    debug!(node = %id, %command, "Cutting node");

    let outcome = executor
        .execute(&command, None)
        .await
        .and_then(|report| report.into_result());
    match outcome {
        Ok(_) => (ProcessingResult::success(id, name, output), true),
        Err(err) => {
            warn!(node = %id, error = %err, "Lossless cut failed");
            let launched = !matches!(err, EditorError::Launch { .. });
            (ProcessingResult::failed(id, name, err.to_string()), launched)
        }
    }
}
