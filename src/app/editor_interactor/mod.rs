// Editor interactor - Orchestrates timeline exports and media imports

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::app::config::EditorConfig;
use crate::domain::errors::ValidationError;
use crate::domain::model::*;
use crate::domain::rules::ImportPolicy;
use crate::engine::{BatchSummary, EditorEvent, EventSink, ExecutionReport, LosslessBatch, ProgressMonitor};
use crate::error::EditorResult;
use crate::ports::ExecutePort;
use crate::query::validate::{require, RequiredField};
use crate::query::{Query, QueryKind, PROXY_FORMAT, THUMBNAIL_FORMAT};
use crate::utils::path::PathUtils;

/// What a dispatched query produced
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Probed media duration, when the transcoder printed one
    Duration(Option<f64>),
    Proxy(ProxyOutcome),
    /// Path of the written thumbnail
    Thumbnail(String),
    Lossless(BatchSummary),
    Merged(ProcessingResult),
}

/// Result of a proxy creation
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyOutcome {
    pub output: String,
    /// Duration discovered from the progress stream
    pub duration: Option<f64>,
}

/// Interactor owning the timeline and running queries against it
pub struct EditorInteractor {
    timeline: Timeline,
    config: EditorConfig,
    execute_port: Arc<dyn ExecutePort>,
    events: EventSink,
}

impl EditorInteractor {
    /// Create new editor interactor with injected port and event sink
    pub fn new(config: EditorConfig, execute_port: Arc<dyn ExecutePort>, events: EventSink) -> Self {
        Self {
            timeline: Timeline::new(),
            config,
            execute_port,
            events,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.timeline
    }

    /// Replace the timeline with persisted state
    pub fn load_timeline(&mut self, timeline: Timeline) {
        info!(nodes = timeline.len(), "Loaded timeline");
        self.timeline = timeline;
    }

    pub fn reset_timeline(&mut self) {
        self.timeline.reset();
    }

    /// Drop every node cut from a source removed from the project
    pub fn remove_source(&mut self, rid: &str) -> usize {
        let removed = self.timeline.delete_rid_references(rid);
        info!(rid, removed, "Removed source references");
        removed
    }

    /// Planned length of the whole timeline in seconds
    pub fn track_duration(&self) -> f64 {
        self.timeline.total_duration()
    }

    /// Dispatch one query kind against the current timeline
    pub async fn run(&self, kind: QueryKind, opts: ProcessingOpts) -> EditorResult<QueryOutcome> {
        match kind {
            QueryKind::DurationProbe => self.probe_duration(opts).await.map(QueryOutcome::Duration),
            QueryKind::CreateProxy => self.create_proxy(opts).await.map(QueryOutcome::Proxy),
            QueryKind::CreateThumbnail => self.create_thumbnail(opts).await.map(QueryOutcome::Thumbnail),
            QueryKind::LosslessCut => self.export_lossless(opts).await.map(QueryOutcome::Lossless),
            QueryKind::Merge => self.export_merged(opts).await.map(QueryOutcome::Merged),
        }
    }

    /// Read the media duration from the transcoder banner
    pub async fn probe_duration(&self, opts: ProcessingOpts) -> EditorResult<Option<f64>> {
        let result = self.probe_duration_inner(opts).await;
        self.finish(result).await
    }

    /// Container-copy a source into the output directory as `.mov`
    pub async fn create_proxy(&self, opts: ProcessingOpts) -> EditorResult<ProxyOutcome> {
        let result = self.create_proxy_inner(opts).await;
        self.finish(result).await
    }

    /// Extract one frame at thumbnail scale as `.png`
    pub async fn create_thumbnail(&self, opts: ProcessingOpts) -> EditorResult<String> {
        let result = self.create_thumbnail_inner(opts).await;
        self.finish(result).await
    }

    /// Re-encode the whole timeline into one file
    pub async fn export_merged(&self, opts: ProcessingOpts) -> EditorResult<ProcessingResult> {
        let result = self.export_merged_inner(opts).await;
        self.finish(result).await
    }

    /// Cut every lossless-flagged node into its own file
    pub async fn export_lossless(&self, opts: ProcessingOpts) -> EditorResult<BatchSummary> {
        let result = self.export_lossless_inner(opts).await;
        self.finish(result).await
    }

    /// Bring a source file into the project: validate it, create its proxy
    /// and report the discovered duration
    pub async fn import_source(&self, source: &Path) -> EditorResult<SourceVideo> {
        let result = self.import_source_inner(source).await;
        self.finish(result).await
    }

    /// Thumbnail for a source file, reusing an existing one
    pub async fn generate_thumbnail(&self, source: &Path) -> EditorResult<String> {
        let result = self.generate_thumbnail_inner(source).await;
        self.finish(result).await
    }

    async fn finish<T>(&self, result: EditorResult<T>) -> EditorResult<T> {
        if let Err(err) = &result {
            warn!(error = %err, "Operation failed");
        }
        self.events.emit(EditorEvent::ExecEnded).await;
        result
    }

    async fn probe_duration_inner(&self, opts: ProcessingOpts) -> EditorResult<Option<f64>> {
        let query = Query::DurationProbe(self.with_input_default(opts));
        let report = self.execute(&query, 0.0).await?;
        Ok(report.monitor.discovered_duration)
    }

    async fn create_proxy_inner(&self, opts: ProcessingOpts) -> EditorResult<ProxyOutcome> {
        let query = Query::CreateProxy(self.with_input_default(opts));
        let output = query.output_file().unwrap_or_default();
        let report = self.execute(&query, 0.0).await?;
        info!(output = %output, "Proxy created");
        Ok(ProxyOutcome {
            output,
            duration: report.monitor.discovered_duration,
        })
    }

    async fn create_thumbnail_inner(&self, opts: ProcessingOpts) -> EditorResult<String> {
        let query = Query::CreateThumbnail(self.with_input_default(opts));
        let output = query.output_file().unwrap_or_default();
        self.execute(&query, 0.0).await?;
        Ok(output)
    }

    async fn export_merged_inner(&self, opts: ProcessingOpts) -> EditorResult<ProcessingResult> {
        let name = opts.filename.clone();
        let query = Query::Merge {
            nodes: self.timeline.nodes().to_vec(),
            opts,
        };
        let output = query.output_file().unwrap_or_default();

        match self.execute(&query, self.track_duration()).await {
            Ok(_) => {
                let result = ProcessingResult::success("", name, output);
                self.events.emit(EditorEvent::OperationResult(result.clone())).await;
                Ok(result)
            }
            Err(err) if err.is_validation() => Err(err),
            Err(err) => {
                let result = ProcessingResult::failed("", name, err.to_string());
                self.events.emit(EditorEvent::OperationResult(result)).await;
                Err(err)
            }
        }
    }

    async fn export_lossless_inner(&self, opts: ProcessingOpts) -> EditorResult<BatchSummary> {
        require(&opts, &[RequiredField::OutputPath, RequiredField::VideoFormat])?;
        let batch = LosslessBatch::new(
            Arc::clone(&self.execute_port),
            self.config.ffmpeg_path.clone(),
            self.config.max_concurrent_jobs,
        );
        Ok(batch.run(self.timeline.nodes(), &opts, &self.events).await)
    }

    async fn import_source_inner(&self, source: &Path) -> EditorResult<SourceVideo> {
        let (name, extension) = PathUtils::name_and_extension(source)?;
        ImportPolicy::validate_extension(&extension)?;

        let project_dir = self.project_dir();
        let proxy = PathUtils::join_file(&project_dir, &name, PROXY_FORMAT);
        if Path::new(&proxy).exists() {
            return Err(ValidationError::ProxyExists(proxy).into());
        }

        let opts = ProcessingOpts {
            input_path: PathUtils::parent_dir(source),
            output_path: project_dir,
            filename: name.clone(),
            video_format: extension.clone(),
            ..ProcessingOpts::default()
        };
        let outcome = self.create_proxy_inner(opts).await?;
        let duration = outcome.duration.unwrap_or_default();

        info!(source = %source.display(), duration, "Imported source video");
        Ok(SourceVideo::new(name, extension, outcome.output, duration))
    }

    async fn generate_thumbnail_inner(&self, source: &Path) -> EditorResult<String> {
        let (name, extension) = PathUtils::name_and_extension(source)?;
        let project_dir = self.project_dir();
        let thumbnail = PathUtils::join_file(&project_dir, &name, THUMBNAIL_FORMAT);
        if Path::new(&thumbnail).exists() {
            info!(thumbnail = %thumbnail, "Thumbnail already exists");
            return Ok(thumbnail);
        }

        let opts = ProcessingOpts {
            input_path: PathUtils::parent_dir(source),
            output_path: project_dir,
            filename: name,
            video_format: extension,
            ..ProcessingOpts::default()
        };
        self.create_thumbnail_inner(opts).await
    }

    /// Build, render and run a query; non-zero exits become errors
    async fn execute(&self, query: &Query, total_duration: f64) -> EditorResult<ExecutionReport> {
        let mut command = query.build()?;
        command.program = self.config.ffmpeg_path.clone();
        let line = command.render();
        info!(kind = %query.kind(), "Running query");

        let keys = query.progress_keys();
        let monitor = if keys.is_empty() {
            None
        } else {
            Some(ProgressMonitor::new(self.events.clone(), total_duration, keys))
        };

        self.execute_port.execute(&line, monitor).await?.into_result()
    }

    fn with_input_default(&self, mut opts: ProcessingOpts) -> ProcessingOpts {
        if opts.input_path.trim().is_empty() {
            opts.input_path = self.project_dir();
        }
        opts
    }

    fn project_dir(&self) -> String {
        self.config.project_dir.to_string_lossy().into_owned()
    }
}
