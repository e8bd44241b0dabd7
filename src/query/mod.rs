//! Query layer: the processing recipes built on [`TranscoderCommand`]
//!
//! Each recipe checks its required options, fills in a fresh command and
//! validates the command shape. Nothing here spawns a process, so a
//! rejected request never reaches the executor.

pub mod validate;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::command::{concat_filter, FilterGraphParams, OutputParams, PreInputParams, TranscoderCommand};
use crate::domain::errors::ValidationError;
use crate::domain::model::{codec, scale, ProcessingOpts, VideoNode};
use crate::engine::monitor::ProgressKey;
use crate::error::EditorResult;
use crate::utils::path::PathUtils;
use validate::{require, RequiredField};

/// Container written by the proxy recipe
pub const PROXY_FORMAT: &str = ".mov";
/// Image format written by the thumbnail recipe
pub const THUMBNAIL_FORMAT: &str = ".png";

/// Discriminant of [`Query`], used for dispatch and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    DurationProbe,
    CreateProxy,
    CreateThumbnail,
    LosslessCut,
    Merge,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryKind::DurationProbe => "duration_probe",
            QueryKind::CreateProxy => "create_proxy",
            QueryKind::CreateThumbnail => "create_thumbnail",
            QueryKind::LosslessCut => "lossless_cut",
            QueryKind::Merge => "merge",
        };
        f.write_str(name)
    }
}

/// One processing request with the payload its recipe needs
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Decode one frame into a null sink to read metadata from stderr
    DurationProbe(ProcessingOpts),
    /// Container copy of a source into the project as `.mov`
    CreateProxy(ProcessingOpts),
    /// Single frame at the thumbnail scale as `.png`
    CreateThumbnail(ProcessingOpts),
    /// Container-copy extraction of one node's interval
    LosslessCut { node: VideoNode, opts: ProcessingOpts },
    /// Re-encoded concatenation of the nodes, in order
    Merge { nodes: Vec<VideoNode>, opts: ProcessingOpts },
}

impl Query {
    pub fn kind(&self) -> QueryKind {
        match self {
            Query::DurationProbe(_) => QueryKind::DurationProbe,
            Query::CreateProxy(_) => QueryKind::CreateProxy,
            Query::CreateThumbnail(_) => QueryKind::CreateThumbnail,
            Query::LosslessCut { .. } => QueryKind::LosslessCut,
            Query::Merge { .. } => QueryKind::Merge,
        }
    }

    pub fn opts(&self) -> &ProcessingOpts {
        match self {
            Query::DurationProbe(opts) | Query::CreateProxy(opts) | Query::CreateThumbnail(opts) => opts,
            Query::LosslessCut { opts, .. } | Query::Merge { opts, .. } => opts,
        }
    }

    /// Progress-protocol keys worth watching while this query runs
    pub fn progress_keys(&self) -> &'static [ProgressKey] {
        match self {
            Query::DurationProbe(_) => &[ProgressKey::Duration],
            Query::CreateProxy(_) => &[ProgressKey::OutTime],
            Query::Merge { .. } => &[ProgressKey::OutTimeUs],
            Query::CreateThumbnail(_) | Query::LosslessCut { .. } => &[],
        }
    }

    /// Path of the file the query produces, if any
    pub fn output_file(&self) -> Option<String> {
        match self {
            Query::DurationProbe(_) => None,
            Query::CreateProxy(opts) => Some(PathUtils::join_file(&opts.output_path, &opts.filename, PROXY_FORMAT)),
            Query::CreateThumbnail(opts) => {
                Some(PathUtils::join_file(&opts.output_path, &opts.filename, THUMBNAIL_FORMAT))
            }
            Query::LosslessCut { node, opts } => {
                Some(PathUtils::join_file(&opts.output_path, &node.name, &opts.video_format))
            }
            Query::Merge { opts, .. } => Some(PathUtils::output_file(opts)),
        }
    }

    /// Validate and assemble the command
    pub fn build(&self) -> EditorResult<TranscoderCommand> {
        let command = match self {
            Query::DurationProbe(opts) => duration_probe(opts)?,
            Query::CreateProxy(opts) => create_proxy(opts)?,
            Query::CreateThumbnail(opts) => create_thumbnail(opts)?,
            Query::LosslessCut { node, opts } => lossless_cut(node, opts)?,
            Query::Merge { nodes, opts } => merge(nodes, opts)?,
        };
        debug!(kind = %self.kind(), "Built transcoder command");
        Ok(command)
    }

    /// Validate, assemble and render the command line
    pub fn render(&self) -> EditorResult<String> {
        Ok(self.build()?.render())
    }
}

fn duration_probe(opts: &ProcessingOpts) -> Result<TranscoderCommand, ValidationError> {
    require(
        opts,
        &[RequiredField::InputPath, RequiredField::Filename, RequiredField::VideoFormat],
    )?;

    Ok(TranscoderCommand {
        pre_input: PreInputParams {
            verbosity: "info".to_string(),
            stats_period: String::new(),
            progress: String::new(),
            ..PreInputParams::default()
        },
        inputs: vec![PathUtils::input_file(opts)],
        output: OutputParams {
            video_frames: 1,
            format: "null".to_string(),
            ..OutputParams::default()
        },
        outputs: vec!["-".to_string()],
        ..TranscoderCommand::default()
    })
}

fn create_proxy(opts: &ProcessingOpts) -> Result<TranscoderCommand, ValidationError> {
    require(
        opts,
        &[
            RequiredField::InputPath,
            RequiredField::OutputPath,
            RequiredField::Filename,
            RequiredField::VideoFormat,
        ],
    )?;

    let command = TranscoderCommand {
        inputs: vec![PathUtils::input_file(opts)],
        output: OutputParams {
            codec: codec::COPY.to_string(),
            ..OutputParams::default()
        },
        outputs: vec![PathUtils::join_file(&opts.output_path, &opts.filename, PROXY_FORMAT)],
        ..TranscoderCommand::default()
    };
    validate::validate_proxy(&command)?;
    Ok(command)
}

fn create_thumbnail(opts: &ProcessingOpts) -> Result<TranscoderCommand, ValidationError> {
    require(
        opts,
        &[
            RequiredField::InputPath,
            RequiredField::OutputPath,
            RequiredField::Filename,
            RequiredField::VideoFormat,
        ],
    )?;

    Ok(TranscoderCommand {
        inputs: vec![PathUtils::input_file(opts)],
        output: OutputParams {
            video_frames: 1,
            scale: scale::THUMBNAIL.to_string(),
            ..OutputParams::default()
        },
        outputs: vec![PathUtils::join_file(&opts.output_path, &opts.filename, THUMBNAIL_FORMAT)],
        ..TranscoderCommand::default()
    })
}

fn lossless_cut(node: &VideoNode, opts: &ProcessingOpts) -> Result<TranscoderCommand, ValidationError> {
    require(opts, &[RequiredField::OutputPath, RequiredField::VideoFormat])?;
    if node.rid.trim().is_empty() {
        return Err(ValidationError::MissingField("source id"));
    }

    let duration = node.duration();
    if duration < 0.0 {
        return Err(ValidationError::NegativeDuration(duration));
    }

    let command = TranscoderCommand {
        pre_input: PreInputParams {
            start_time: node.start,
            ..PreInputParams::default()
        },
        inputs: vec![node.rid.clone()],
        output: OutputParams {
            duration,
            avoid_negative_ts: "make_zero".to_string(),
            codec: codec::COPY.to_string(),
            movflags: "+faststart".to_string(),
            ..OutputParams::default()
        },
        outputs: vec![PathUtils::join_file(&opts.output_path, &node.name, &opts.video_format)],
        ..TranscoderCommand::default()
    };
    validate::validate_lossless_cut(&command)?;
    Ok(command)
}

fn merge(nodes: &[VideoNode], opts: &ProcessingOpts) -> Result<TranscoderCommand, ValidationError> {
    let filter = concat_filter(nodes, &opts.resolution)?;
    require(
        opts,
        &[
            RequiredField::OutputPath,
            RequiredField::Filename,
            RequiredField::VideoFormat,
            RequiredField::Resolution,
            RequiredField::Codec,
            RequiredField::Preset,
            RequiredField::Crf,
        ],
    )?;

    let command = TranscoderCommand {
        inputs: nodes.iter().map(|node| node.rid.clone()).collect(),
        filter_params: FilterGraphParams {
            scale: opts.resolution.clone(),
        },
        filter_graph: vec![filter.graph],
        maps: vec![filter.output_label],
        output: OutputParams {
            video_codec: opts.codec.clone(),
            crf: opts.crf.clone(),
            preset: opts.preset.clone(),
            ..OutputParams::default()
        },
        outputs: vec![PathUtils::output_file(opts)],
        ..TranscoderCommand::default()
    };
    validate::validate_merge(&command)?;
    Ok(command)
}
