//! Command implementations

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::json;
use tokio::task::JoinHandle;
use tracing::info;

use crate::app::{DefaultAppContainer, EditorConfig, EditorInteractor};
use crate::cli::args::{CutArgs, ExportArgs, SourceArgs, TimelineArgs, TimelineOp};
use crate::cli::{Cli, Commands};
use crate::domain::model::{ProcessingOpts, Timeline};
use crate::domain::rules::ImportPolicy;
use crate::engine::{with_distinct_names, JsonEventPrinter};
use crate::query::Query;
use crate::utils::path::PathUtils;

/// Execute the parsed command line
pub async fn run(cli: Cli, config: EditorConfig) -> Result<()> {
    let progress = cli.progress;
    match cli.command {
        Commands::Probe(args) => probe(args, config, progress).await,
        Commands::Import(args) => import(args, config, progress).await,
        Commands::Thumbnail(args) => thumbnail(args, config, progress).await,
        Commands::Export(args) => export(args, config, progress).await,
        Commands::Cut(args) => cut(args, config, progress).await,
        Commands::Timeline(args) => timeline(args),
    }
}

/// An editor plus the task printing its events
struct Session {
    editor: EditorInteractor,
    printer: JoinHandle<usize>,
}

impl Session {
    fn start(config: EditorConfig, progress: bool) -> Result<Self> {
        let container = DefaultAppContainer::new(config).context("Invalid configuration")?;
        let (editor, rx) = container.editor();
        let printer = tokio::spawn(JsonEventPrinter::new(progress).run(rx));
        Ok(Self { editor, printer })
    }

    /// Close the event stream and wait for the printer to drain it
    async fn close(self) {
        drop(self.editor);
        match self.printer.await {
            Ok(count) => info!("Printed {} events", count),
            Err(err) => tracing::warn!(error = %err, "Event printer stopped early"),
        }
    }
}

/// Options describing a single source file
fn source_opts(input: &Path) -> Result<ProcessingOpts> {
    let (filename, extension) = PathUtils::name_and_extension(input)?;
    ImportPolicy::validate_extension(&extension)?;
    Ok(ProcessingOpts {
        input_path: PathUtils::parent_dir(input),
        filename,
        video_format: extension,
        ..ProcessingOpts::default()
    })
}

fn print_command(query: &Query, program: &str) -> Result<()> {
    let mut command = query.build()?;
    command.program = program.to_string();
    println!("{}", command.render());
    Ok(())
}

/// Execute the probe command
async fn probe(args: SourceArgs, config: EditorConfig, progress: bool) -> Result<()> {
    let opts = source_opts(&args.input)?;
    if args.dry_run {
        return print_command(&Query::DurationProbe(opts), &config.ffmpeg_path);
    }

    let session = Session::start(config, progress)?;
    let result = session.editor.probe_duration(opts).await;
    session.close().await;

    match result.context("Duration probe failed")? {
        Some(seconds) => info!("Duration of {}: {:.3}s", args.input.display(), seconds),
        None => info!("No duration reported for {}", args.input.display()),
    }
    Ok(())
}

/// Execute the import command
async fn import(args: SourceArgs, config: EditorConfig, progress: bool) -> Result<()> {
    if args.dry_run {
        let mut opts = source_opts(&args.input)?;
        opts.output_path = config.project_dir.to_string_lossy().into_owned();
        return print_command(&Query::CreateProxy(opts), &config.ffmpeg_path);
    }

    let session = Session::start(config, progress)?;
    let result = session.editor.import_source(&args.input).await;
    session.close().await;

    let video = result.with_context(|| format!("Failed to import {}", args.input.display()))?;
    println!("{}", serde_json::to_string(&json!({ "video": video }))?);
    Ok(())
}

/// Execute the thumbnail command
async fn thumbnail(args: SourceArgs, config: EditorConfig, progress: bool) -> Result<()> {
    if args.dry_run {
        let mut opts = source_opts(&args.input)?;
        opts.output_path = config.project_dir.to_string_lossy().into_owned();
        return print_command(&Query::CreateThumbnail(opts), &config.ffmpeg_path);
    }

    let session = Session::start(config, progress)?;
    let result = session.editor.generate_thumbnail(&args.input).await;
    session.close().await;

    let path = result.context("Thumbnail generation failed")?;
    println!("{}", serde_json::to_string(&json!({ "thumbnail": path }))?);
    Ok(())
}

/// Execute the merged export
async fn export(args: ExportArgs, config: EditorConfig, progress: bool) -> Result<()> {
    let timeline = read_timeline(&args.timeline, false)?;
    let opts = ProcessingOpts {
        resolution: args.resolution,
        codec: args.codec,
        crf: args.crf,
        preset: args.preset,
        output_path: args.output_dir.to_string_lossy().into_owned(),
        filename: args.filename,
        video_format: args.format,
        ..ProcessingOpts::default()
    };

    if args.dry_run {
        let query = Query::Merge {
            nodes: timeline.into_nodes(),
            opts,
        };
        return print_command(&query, &config.ffmpeg_path);
    }

    let mut session = Session::start(config, progress)?;
    session.editor.load_timeline(timeline);
    let result = session.editor.export_merged(opts).await;
    session.close().await;

    result.context("Merged export failed")?;
    Ok(())
}

/// Execute the lossless batch export
async fn cut(args: CutArgs, config: EditorConfig, progress: bool) -> Result<()> {
    let mut timeline = read_timeline(&args.timeline, false)?;
    if args.all {
        timeline.mark_all_lossless()?;
    }
    let opts = ProcessingOpts {
        output_path: args.output_dir.to_string_lossy().into_owned(),
        video_format: args.format,
        ..ProcessingOpts::default()
    };

    if args.dry_run {
        for node in with_distinct_names(timeline.lossless_nodes()) {
            let query = Query::LosslessCut {
                node,
                opts: opts.clone(),
            };
            print_command(&query, &config.ffmpeg_path)?;
        }
        return Ok(());
    }

    let mut session = Session::start(config, progress)?;
    session.editor.load_timeline(timeline);
    let result = session.editor.export_lossless(opts).await;
    session.close().await;

    let summary = result.context("Lossless export failed")?;
    if summary.failed > 0 {
        bail!("{} of {} lossless cuts failed", summary.failed, summary.results.len());
    }
    Ok(())
}

/// Execute a timeline edit and persist the result
fn timeline(args: TimelineArgs) -> Result<()> {
    let creating = matches!(args.op, TimelineOp::Insert { .. });
    let mut timeline = read_timeline(&args.file, creating)?;

    let output = match args.op {
        TimelineOp::Show => {
            println!("{}", serde_json::to_string_pretty(&timeline)?);
            return Ok(());
        }
        TimelineOp::Insert {
            rid,
            name,
            start,
            end,
            position,
        } => {
            let position = position.unwrap_or(timeline.len());
            json!({ "inserted": timeline.insert(rid, name, start, end, position)? })
        }
        TimelineOp::Delete { position } => json!({ "deleted": timeline.delete(position)? }),
        TimelineOp::Rename { position, name } => {
            timeline.rename(position, name)?;
            json!({ "renamed": timeline.get(position) })
        }
        TimelineOp::Split {
            mode,
            position,
            start,
            end,
        } => json!({ "produced": timeline.split(mode, position, start, end)? }),
        TimelineOp::Toggle { position } => {
            json!({ "losslessexport": timeline.toggle_lossless(position)? })
        }
        TimelineOp::MarkAll => {
            timeline.mark_all_lossless()?;
            json!({ "marked": timeline.len() })
        }
        TimelineOp::UnmarkAll => {
            timeline.unmark_all_lossless()?;
            json!({ "unmarked": timeline.len() })
        }
        TimelineOp::RemoveSource { rid } => {
            json!({ "removed": timeline.delete_rid_references(&rid) })
        }
    };

    write_timeline(&args.file, &timeline)?;
    println!("{}", output);
    Ok(())
}

fn read_timeline(path: &Path, allow_missing: bool) -> Result<Timeline> {
    if allow_missing && !path.exists() {
        return Ok(Timeline::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read timeline {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid timeline document {}", path.display()))
}

fn write_timeline(path: &Path, timeline: &Timeline) -> Result<()> {
    let content = serde_json::to_string_pretty(timeline)?;
    std::fs::write(path, content).with_context(|| format!("Failed to write timeline {}", path.display()))
}
