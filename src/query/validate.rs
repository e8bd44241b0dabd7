// Recipe validation - required options and command shape checks

use crate::command::TranscoderCommand;
use crate::domain::errors::ValidationError;
use crate::domain::model::{codec, ProcessingOpts};

/// Options a recipe cannot run without
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    InputPath,
    OutputPath,
    Filename,
    VideoFormat,
    Resolution,
    Codec,
    Crf,
    Preset,
}

impl RequiredField {
    fn label(self) -> &'static str {
        match self {
            RequiredField::InputPath => "input path",
            RequiredField::OutputPath => "output path",
            RequiredField::Filename => "filename",
            RequiredField::VideoFormat => "video format",
            RequiredField::Resolution => "resolution",
            RequiredField::Codec => "video codec",
            RequiredField::Crf => "crf",
            RequiredField::Preset => "preset",
        }
    }

    fn value(self, opts: &ProcessingOpts) -> &str {
        match self {
            RequiredField::InputPath => &opts.input_path,
            RequiredField::OutputPath => &opts.output_path,
            RequiredField::Filename => &opts.filename,
            RequiredField::VideoFormat => &opts.video_format,
            RequiredField::Resolution => &opts.resolution,
            RequiredField::Codec => &opts.codec,
            RequiredField::Crf => &opts.crf,
            RequiredField::Preset => &opts.preset,
        }
    }
}

/// Fail on the first listed field that is blank
pub fn require(opts: &ProcessingOpts, fields: &[RequiredField]) -> Result<(), ValidationError> {
    match fields.iter().find(|field| field.value(opts).trim().is_empty()) {
        Some(field) => Err(ValidationError::MissingField(field.label())),
        None => Ok(()),
    }
}

fn expect_inputs(command: &TranscoderCommand, expected: usize) -> Result<(), ValidationError> {
    let found = command.distinct_inputs().len();
    if found != expected {
        return Err(ValidationError::InputCount { expected, found });
    }
    Ok(())
}

fn expect_outputs(command: &TranscoderCommand, expected: usize) -> Result<(), ValidationError> {
    let found = command.outputs.len();
    if found != expected {
        return Err(ValidationError::OutputCount { expected, found });
    }
    Ok(())
}

fn non_empty(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

/// Encoder settings render unquoted, so only plain tokens are accepted
fn plain_token(value: &str, field: &'static str) -> Result<(), ValidationError> {
    non_empty(value, field)?;
    let plain = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | '.' | '_' | '+' | '-'));
    if !plain {
        return Err(ValidationError::UnsafeValue {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// One input, one output, container copy
pub fn validate_proxy(command: &TranscoderCommand) -> Result<(), ValidationError> {
    expect_inputs(command, 1)?;
    expect_outputs(command, 1)?;
    if command.output.codec != codec::COPY {
        return Err(ValidationError::CodecMustBeCopy(command.output.codec.clone()));
    }
    Ok(())
}

/// One input, one output, non-negative duration
pub fn validate_lossless_cut(command: &TranscoderCommand) -> Result<(), ValidationError> {
    expect_inputs(command, 1)?;
    expect_outputs(command, 1)?;
    if command.output.duration < 0.0 {
        return Err(ValidationError::NegativeDuration(command.output.duration));
    }
    if command.output.codec != codec::COPY {
        return Err(ValidationError::CodecMustBeCopy(command.output.codec.clone()));
    }
    Ok(())
}

/// At least one input and exactly one output, plus the encoding settings
/// every clip is normalized with
pub fn validate_merge(command: &TranscoderCommand) -> Result<(), ValidationError> {
    if command.inputs.is_empty() {
        return Err(ValidationError::NoNodesProvided);
    }
    expect_outputs(command, 1)?;
    plain_token(&command.filter_params.scale, "resolution")?;
    plain_token(&command.output.video_codec, "video codec")?;
    plain_token(&command.output.preset, "preset")?;
    plain_token(&command.output.crf, "crf")?;
    Ok(())
}
