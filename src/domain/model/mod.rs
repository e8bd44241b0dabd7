// Domain models - Core types and data structures

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod timeline;

pub use timeline::Timeline;

/// Name given to nodes created or renamed with an empty label
pub const DEFAULT_NODE_NAME: &str = "untitled";

/// Fixed gap in seconds left between intervals produced by a split
pub const GUARD_BAND: f64 = 0.1;

/// Tolerance used when comparing interval bounds
pub const EPSILON: f64 = 1e-6;

/// Output scales understood by the merge recipe
pub mod scale {
    pub const HD: &str = "1920:1080";
    pub const QHD: &str = "2560x1440";
    pub const UHD: &str = "3840:2160";
    pub const THUMBNAIL: &str = "256x256";
}

/// Codec names passed through to the transcoder
pub mod codec {
    pub const H264: &str = "libx264";
    pub const H264_RGB: &str = "libx264rgb";
    pub const COPY: &str = "copy";
}

/// Constant-rate-factor presets
pub mod crf {
    pub const STANDARD: &str = "23";
    pub const HIGH: &str = "18";
}

/// Encoder speed presets
pub mod preset {
    pub const SLOW: &str = "slow";
    pub const MEDIUM: &str = "medium";
    pub const FAST: &str = "fast";
}

/// Generate an identifier: a v4 uuid with the dashes stripped
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// One trimmed interval of a source video placed on the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoNode {
    /// Source media this interval was cut from
    pub rid: String,
    /// Unique id of this node
    pub id: String,
    pub name: String,
    pub start: f64,
    pub end: f64,
    #[serde(rename = "losslessexport", default)]
    pub lossless_export: bool,
}

impl VideoNode {
    /// Create a node with a freshly generated id
    pub fn new(rid: impl Into<String>, name: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            rid: rid.into(),
            id: new_id(),
            name: normalize_name(name.into()),
            start,
            end,
            lossless_export: false,
        }
    }

    /// Planned playback length of the interval
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// New node over another interval of the same source, keeping the label
    pub(crate) fn derive(&self, start: f64, end: f64) -> Self {
        Self::new(self.rid.clone(), self.name.clone(), start, end)
    }
}

pub(crate) fn normalize_name(name: String) -> String {
    if name.trim().is_empty() {
        DEFAULT_NODE_NAME.to_string()
    } else {
        name
    }
}

/// How a split carves up the node at the given position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitMode {
    /// Keep `[start, end]` and the remainder after `end`
    #[serde(rename = "sliceCut")]
    SliceCut,
    /// Cut out `[start, end]` as its own node between the head and tail
    #[serde(rename = "intervalCut")]
    IntervalCut,
}

impl SplitMode {
    /// Number of nodes a successful split produces
    pub fn produced_nodes(self) -> usize {
        match self {
            SplitMode::SliceCut => 2,
            SplitMode::IntervalCut => 3,
        }
    }
}

impl fmt::Display for SplitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitMode::SliceCut => write!(f, "sliceCut"),
            SplitMode::IntervalCut => write!(f, "intervalCut"),
        }
    }
}

impl FromStr for SplitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sliceCut" | "slice-cut" | "slice" => Ok(SplitMode::SliceCut),
            "intervalCut" | "interval-cut" | "interval" => Ok(SplitMode::IntervalCut),
            other => Err(format!("unknown split mode: {}", other)),
        }
    }
}

/// One export or processing request. Built per request and never stored
/// with the timeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingOpts {
    /// Target resolution used by the scale filter
    pub resolution: String,
    pub codec: String,
    pub crf: String,
    pub preset: String,
    /// Directory holding the source file
    pub input_path: String,
    /// Directory receiving the produced file
    pub output_path: String,
    /// File name without extension
    pub filename: String,
    /// Container extension including the leading dot, e.g. `.mp4`
    pub video_format: String,
}

impl ProcessingOpts {
    /// Options used for a merged export when the caller sets nothing else
    pub fn export_defaults() -> Self {
        Self {
            resolution: scale::HD.to_string(),
            codec: codec::H264_RGB.to_string(),
            crf: crf::HIGH.to_string(),
            preset: preset::MEDIUM.to_string(),
            filename: "output".to_string(),
            video_format: ".mp4".to_string(),
            ..Self::default()
        }
    }
}

/// A source file imported into the project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceVideo {
    pub id: String,
    pub name: String,
    pub extension: String,
    pub filepath: String,
    /// Seconds, as discovered while creating the proxy
    pub duration: f64,
}

impl SourceVideo {
    pub fn new(
        name: impl Into<String>,
        extension: impl Into<String>,
        filepath: impl Into<String>,
        duration: f64,
    ) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            extension: extension.into(),
            filepath: filepath.into(),
            duration,
        }
    }
}

/// Outcome of one processing operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Success,
    Failed,
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultStatus::Success => write!(f, "success"),
            ResultStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Per-operation result pushed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub id: String,
    pub name: String,
    pub status: ResultStatus,
    /// Output path on success, error text on failure
    pub message: String,
}

impl ProcessingResult {
    /// Build a result, generating an id when none is given
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        status: ResultStatus,
        message: impl Into<String>,
    ) -> Self {
        let id = id.into();
        Self {
            id: if id.is_empty() { new_id() } else { id },
            name: name.into(),
            status,
            message: message.into(),
        }
    }

    pub fn success(id: impl Into<String>, name: impl Into<String>, output: impl Into<String>) -> Self {
        Self::new(id, name, ResultStatus::Success, output)
    }

    pub fn failed(id: impl Into<String>, name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(id, name, ResultStatus::Failed, reason)
    }

    pub fn is_success(&self) -> bool {
        self.status == ResultStatus::Success
    }
}
